use serde::Deserialize;

use crate::errors::AppError;
use crate::intake::attachments::InboundAttachment;

/// Inbound webhook payload from the mail provider. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InboundMessage {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub text_body: String,
    #[serde(default)]
    pub attachments: Vec<InboundAttachment>,
}

impl InboundMessage {
    /// Parses a raw webhook body, turning malformed JSON into a validation error.
    pub fn from_slice(body: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("malformed inbound payload: {e}")))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.sender().is_empty() {
            return Err(AppError::Validation("From cannot be empty".to_string()));
        }
        if self.text_body.trim().is_empty() {
            return Err(AppError::Validation("TextBody cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Sender address, compared byte-for-byte when resolving an existing applicant.
    pub fn sender(&self) -> &str {
        self.from.trim()
    }

    /// Display name, falling back to the address when the provider sent none.
    pub fn display_name(&self) -> &str {
        match self.from_name.trim() {
            "" => self.sender(),
            name => name,
        }
    }
}
