use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use invoices_core::invoice::InvoiceError;
use invoices_core::storage::invoice_error_to_status_code;

/// Application error type that wraps `anyhow::Error`.
///
/// Invoice errors map to their HTTP status; anything else is a 500. The body is always
/// `{"message": ...}`. Backing store details are logged, never returned.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, message) = match self.0.downcast_ref::<InvoiceError>() {
            Some(InvoiceError::BackingStore(detail)) => {
                tracing::error!(error = %detail, "Backing store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Some(invoice_error) => {
                let code = invoice_error_to_status_code(invoice_error);
                let status =
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                tracing::warn!(status = %status, message = %invoice_error, "API error");
                (status, invoice_error.to_string())
            }
            None => {
                tracing::error!(error = %self.0, "Application error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status_code,
            Json(serde_json::json!({ "message": message })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
