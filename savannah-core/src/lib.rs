pub mod booking;
pub mod identity;
pub mod invoice;
pub mod kpi;
pub mod payment;
pub mod repository;
pub mod storage;

use savannah_shared::{FieldError, WindowError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Validation failed")]
    InvalidFields(Vec<FieldError>),
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Token is no longer valid")]
    StaleToken,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Payment not successful: {0}")]
    PaymentNotSuccessful(String),
    #[error("Amount mismatch: expected {expected}, gateway reported {reported}")]
    AmountMismatch { expected: f64, reported: f64 },
    #[error("Payment gateway error: {0}")]
    Gateway(String),
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<WindowError> for CoreError {
    fn from(err: WindowError) -> Self {
        CoreError::InvalidRange(err.to_string())
    }
}

impl From<Vec<FieldError>> for CoreError {
    fn from(errors: Vec<FieldError>) -> Self {
        CoreError::InvalidFields(errors)
    }
}
