use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed for `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { field, reason: reason.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Message safe to surface to the operator without leaking internals.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The request could not be processed. Check inputs and try again.",
            Self::Persistence(_) => "Stored data is temporarily unavailable. Please retry shortly.",
            Self::Configuration(_) => "The application configuration is invalid.",
        }
    }
}
