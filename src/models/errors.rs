use thiserror::Error;

/// Failure taxonomy shared by all engine operations.
///
/// Authorization checks never produce these — they return an
/// [`crate::models::AccessDecision`] value instead. Everything else signals
/// failure through this enum; the transport layer owns the mapping to
/// status codes. The engine never retries on `Unexpected`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Unexpected(err.to_string())
    }
}
