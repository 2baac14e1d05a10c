use thiserror::Error;

/// Failure taxonomy for the two request pipelines.
///
/// Every variant maps to one HTTP status class and carries the client-safe
/// detail string for the response body. Raw upstream error payloads never
/// land here; adapters log them server-side and re-signal one of these.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The body is neither parseable JSON nor a JSON object.
    #[error("{0}")]
    InvalidPayload(String),
    /// One or more required fields are absent or empty after trimming.
    #[error("{0}")]
    MissingField(String),
    /// A required environment value is absent at request time. Signals
    /// deployment misconfiguration, not user input.
    #[error("{name} is missing from the server environment.")]
    ConfigurationMissing { name: &'static str },
    /// The storage insert was rejected or errored.
    #[error("{0}")]
    PersistenceFailure(String),
    /// An email send was rejected or errored.
    #[error("{0}")]
    NotificationFailure(String),
    /// The AI completion call errored or the transport failed.
    #[error("{0}")]
    UpstreamServiceFailure(String),
}

impl PipelineError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPayload(_) | Self::MissingField(_) => 400,
            Self::ConfigurationMissing { .. } | Self::PersistenceFailure(_) => 500,
            Self::NotificationFailure(_) | Self::UpstreamServiceFailure(_) => 502,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
