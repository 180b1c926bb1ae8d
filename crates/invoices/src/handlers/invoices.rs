//! Invoice CRUD handlers.
//!
//! Thin adapters between HTTP and [`InvoiceStore`](crate::store::InvoiceStore): they
//! extract the request, call one store operation and shape the response.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use invoices_core::invoice::{
    CreateInvoiceRequest, InvoiceError, InvoicePage, InvoiceRecord, ListInvoicesQuery,
    UpdateInvoiceRequest, ValidationError,
};

use crate::{handlers::AppError, state::AppState};

fn invalid_body(rejection: impl std::fmt::Display) -> AppError {
    InvoiceError::from(ValidationError::InvalidBody(rejection.to_string())).into()
}

/// Create an invoice (POST /invoices).
pub async fn create_invoice(
    State(state): State<AppState>,
    payload: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| invalid_body(e.body_text()))?;

    let record = state.store.create(request).await?;
    let location = format!(
        "/invoices/{}/{}",
        record.invoice.customer_id, record.invoice.invoice_id
    );

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(record),
    ))
}

/// List invoices (GET /invoices).
///
/// Query parameters: `status`, `customerId`, `pageSize`, `cursor` (or `lastEvaluatedKey`).
pub async fn list_invoices(
    State(state): State<AppState>,
    query: Result<Query<ListInvoicesQuery>, QueryRejection>,
) -> Result<Json<InvoicePage>, AppError> {
    let Query(query) = query.map_err(|e| invalid_body(e.body_text()))?;

    let page = state.store.list(&query).await?;
    Ok(Json(page))
}

/// Get a single invoice (GET /invoices/{customer_id}/{invoice_id}).
pub async fn get_invoice(
    State(state): State<AppState>,
    Path((customer_id, invoice_id)): Path<(String, String)>,
) -> Result<Json<InvoiceRecord>, AppError> {
    let record = state.store.get(&customer_id, &invoice_id).await?;
    Ok(Json(record))
}

/// Update status and/or amount (PATCH or PUT /invoices/{customer_id}/{invoice_id}).
pub async fn update_invoice(
    State(state): State<AppState>,
    Path((customer_id, invoice_id)): Path<(String, String)>,
    payload: Result<Json<UpdateInvoiceRequest>, JsonRejection>,
) -> Result<Json<InvoiceRecord>, AppError> {
    let Json(request) = payload.map_err(|e| invalid_body(e.body_text()))?;

    let record = state
        .store
        .update(&customer_id, &invoice_id, request)
        .await?;
    Ok(Json(record))
}

/// Delete an invoice (DELETE /invoices/{customer_id}/{invoice_id}).
///
/// Returns 204 whether or not the invoice existed.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path((customer_id, invoice_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.store.delete(&customer_id, &invoice_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
