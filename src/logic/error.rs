use thiserror::Error;

/// Failure of a single property reference request
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not supported: {0}")]
    MethodNotSupported(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReferenceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ReferenceError::NotFound(message.into())
    }

    pub fn method_not_supported(message: impl Into<String>) -> Self {
        ReferenceError::MethodNotSupported(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ReferenceError::BadRequest(message.into())
    }
}

pub type ReferenceResult<T> = std::result::Result<T, ReferenceError>;
