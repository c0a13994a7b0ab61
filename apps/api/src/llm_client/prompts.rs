// Cross-cutting prompt fragments. Feature prompts live next to the code that uses them.

/// Appended to every system prompt that expects a machine-readable answer.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
