//! Pure functions for mapping invoice errors to HTTP status codes.
//!
//! This module follows the Functional Core pattern - pure functions with no side effects.

use crate::invoice::InvoiceError;

/// Maps an [`InvoiceError`] to an HTTP status code.
///
/// - `Validation` -> 400 (Bad Request)
/// - `NotFound` -> 404 (Not Found)
/// - `MalformedCursor` -> 400 (Bad Request)
/// - `NoUpdatableFields` -> 400 (Bad Request)
/// - `BackingStore` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use invoices_core::invoice::InvoiceError;
/// use invoices_core::storage::invoice_error_to_status_code;
///
/// let error = InvoiceError::NotFound("abc/def".to_string());
/// assert_eq!(invoice_error_to_status_code(&error), 404);
/// ```
pub fn invoice_error_to_status_code(error: &InvoiceError) -> u16 {
    match error {
        InvoiceError::Validation(_) => 400,
        InvoiceError::NotFound(_) => 404,
        InvoiceError::MalformedCursor(_) => 400,
        InvoiceError::NoUpdatableFields => 400,
        InvoiceError::BackingStore(_) => 500,
    }
}
