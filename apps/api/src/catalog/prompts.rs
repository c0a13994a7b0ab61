// Qualification drafting prompt templates.

pub const QUALIFICATIONS_SYSTEM: &str = "\
You are a recruiting analyst. You turn job descriptions into short, checkable \
qualification labels that a screener can mark as met or unmet for an applicant.";

pub const QUALIFICATIONS_PROMPT: &str = r#"Derive the qualifications required for this job.

JOB TITLE:
{title}

JOB DESCRIPTION:
{description}

RULES:
1. Return a JSON array of strings, for example ["3+ years React", "TypeScript", "Team leadership"].
2. Each label is a short noun phrase that can be answered yes/no from an application email.
3. Only list qualifications the description actually asks for. Do NOT invent any.
4. If the description has no qualifications, return an empty array: [].
5. Return ONLY the JSON array."#;
