use crate::errors::PipelineError;
use crate::payload::{self, Payload};

/// A visitor message bound for the AI assistant. One per call, never
/// persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Normalizes and validates an inbound chat body.
    pub fn parse(body: Payload<'_>) -> Result<Self, PipelineError> {
        let map = payload::into_object(body, "Invalid chat payload")?;
        let message = payload::required_trimmed(&map, "message")
            .ok_or_else(|| PipelineError::MissingField("Message is required".to_string()))?;
        Ok(Self { message })
    }
}
