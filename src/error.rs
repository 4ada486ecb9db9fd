use crate::db::StoreError;
use crate::validation::ValidationErrors;

/// Outcome of a failed service call.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed identifier or an otherwise unusable request.
    #[error("{0}")]
    BadRequest(String),
    /// The request failed field-level validation.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    /// Any other store failure, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
