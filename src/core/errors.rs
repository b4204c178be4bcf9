use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum LedgerError {
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Transaction {0} not found")]
    TransactionNotFound(String),
    #[error("Payment {0} not found")]
    PaymentNotFound(String),
    #[error("Path id {path} does not match body id {body}")]
    IdMismatch { path: String, body: String },
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
    #[error("Store operation `{0}` timed out")]
    Timeout(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl LedgerError {
    pub fn invalid(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        LedgerError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }
}
