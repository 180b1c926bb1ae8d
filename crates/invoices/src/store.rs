//! The invoice store: the operations exposed to callers.
//!
//! Composes key derivation, index routing, cursor encoding and update planning from
//! `invoices_core` around one [`InvoiceRepository`]. Input is validated before any
//! repository call; each operation logs its outcome.

use std::sync::Arc;

use invoices_core::invoice::{
    pagination, route, CreateInvoiceRequest, InvoiceError, InvoiceKey, InvoicePage,
    InvoiceRecord, ListInvoicesQuery, UpdateInvoiceRequest,
};
use invoices_core::storage::{DeleteOutcome, InvoiceRepository, RepositoryError};

type Result<T> = std::result::Result<T, InvoiceError>;

/// Invoice operations over a repository.
#[derive(Clone)]
pub struct InvoiceStore {
    repo: Arc<dyn InvoiceRepository>,
}

impl InvoiceStore {
    pub fn new(repo: Arc<dyn InvoiceRepository>) -> Self {
        Self { repo }
    }

    /// Validates and stores a new invoice.
    ///
    /// The customer id is derived from the email and the invoice id is freshly drawn;
    /// the write fails rather than overwrite an existing record.
    pub async fn create(&self, request: CreateInvoiceRequest) -> Result<InvoiceRecord> {
        let record = request.validate()?.into_record();

        self.repo
            .create_invoice(&record)
            .await
            .inspect_err(|e| log_store_error("create", e))?;

        tracing::info!(
            customer_id = %record.invoice.customer_id,
            invoice_id = %record.invoice.invoice_id,
            "Invoice created"
        );
        Ok(record)
    }

    /// Fetches one invoice.
    pub async fn get(&self, customer_id: &str, invoice_id: &str) -> Result<InvoiceRecord> {
        let key = InvoiceKey::parse(customer_id, invoice_id)?;
        self.fetch(&key).await
    }

    /// Lists one page of invoices, newest first.
    pub async fn list(&self, query: &ListInvoicesQuery) -> Result<InvoicePage> {
        let list_query = route(&query.filter(), query.page_size(), query.cursor())?;

        let page = self
            .repo
            .query_invoices(&list_query)
            .await
            .inspect_err(|e| log_store_error("list", e))?;

        tracing::debug!(
            index = list_query.index.name(),
            count = page.items.len(),
            more = page.next.is_some(),
            "Invoices listed"
        );

        Ok(InvoicePage {
            count: page.items.len(),
            data: page.items,
            page_size: list_query.limit.get(),
            cursor: page.next.as_ref().map(pagination::encode),
        })
    }

    /// Applies a partial update and returns the updated invoice.
    ///
    /// A status change also rewrites the status index attributes, which needs the stored
    /// date, so the invoice is read first.
    pub async fn update(
        &self,
        customer_id: &str,
        invoice_id: &str,
        request: UpdateInvoiceRequest,
    ) -> Result<InvoiceRecord> {
        let key = InvoiceKey::parse(customer_id, invoice_id)?;
        let plan = request.into_plan()?;

        let current = self.fetch(&key).await?;
        let assignments = plan.assignments(&current.invoice.date);

        let updated = self
            .repo
            .update_invoice(&key, &assignments)
            .await
            .inspect_err(|e| log_store_error("update", e))?;

        tracing::info!(
            %key,
            fields = assignments.len(),
            "Invoice updated"
        );
        Ok(updated)
    }

    /// Deletes an invoice. Deleting an absent invoice succeeds.
    pub async fn delete(&self, customer_id: &str, invoice_id: &str) -> Result<DeleteOutcome> {
        let key = InvoiceKey::parse(customer_id, invoice_id)?;

        let outcome = self
            .repo
            .delete_invoice(&key)
            .await
            .inspect_err(|e| log_store_error("delete", e))?;

        match outcome {
            DeleteOutcome::Deleted => tracing::info!(%key, "Invoice deleted"),
            DeleteOutcome::AlreadyAbsent => tracing::debug!(%key, "Invoice already absent"),
        }
        Ok(outcome)
    }

    /// Checks that the backing store answers.
    pub async fn ping(&self) -> std::result::Result<(), RepositoryError> {
        self.repo.ping().await
    }

    async fn fetch(&self, key: &InvoiceKey) -> Result<InvoiceRecord> {
        self.repo
            .get_invoice(key)
            .await
            .inspect_err(|e| log_store_error("get", e))?
            .ok_or_else(|| InvoiceError::NotFound(key.to_string()))
    }
}

fn log_store_error(operation: &'static str, error: &RepositoryError) {
    match error {
        RepositoryError::NotFound { .. } => {
            tracing::debug!(operation, error = %error, "Invoice not found")
        }
        _ => tracing::error!(operation, error = %error, "Backing store request failed"),
    }
}
