use thiserror::Error;

use crate::storage::RepositoryError;

use super::pagination::CursorError;

/// Input problems detected before any backing store call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid amount: must be zero or a finite number between 1e-130 and 1e126 in magnitude")]
    InvalidAmount,
    #[error("Invalid status '{0}': must not contain '#'")]
    InvalidStatus(String),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

/// Errors surfaced by the invoice store operations.
///
/// Every variant except [`InvoiceError::BackingStore`] is caused by the client and is
/// never worth retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invoice not found: {0}")]
    NotFound(String),
    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),
    #[error("No valid fields provided for update (status, amount)")]
    NoUpdatableFields,
    #[error("Backing store error: {0}")]
    BackingStore(String),
}

impl InvoiceError {
    /// Returns true when the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, InvoiceError::BackingStore(_))
    }
}

impl From<CursorError> for InvoiceError {
    fn from(err: CursorError) -> Self {
        InvoiceError::MalformedCursor(err.to_string())
    }
}

impl From<RepositoryError> for InvoiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { id, .. } => InvoiceError::NotFound(id),
            other => InvoiceError::BackingStore(other.to_string()),
        }
    }
}
