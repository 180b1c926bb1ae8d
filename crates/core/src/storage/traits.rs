use async_trait::async_trait;

use crate::invoice::{Assignment, InvoiceKey, InvoiceRecord, ListQuery};

use super::{DeleteOutcome, QueryPage, Result};

/// Repository for invoice records.
///
/// Implementations execute exactly one backing-store request per call and never retry.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Gets an invoice by its primary key.
    async fn get_invoice(&self, key: &InvoiceKey) -> Result<Option<InvoiceRecord>>;

    /// Runs one page of a listing on a secondary index.
    async fn query_invoices(&self, query: &ListQuery) -> Result<QueryPage>;

    /// Stores a new invoice. Fails with `AlreadyExists` if the key is taken.
    async fn create_invoice(&self, record: &InvoiceRecord) -> Result<()>;

    /// Applies attribute writes to an existing invoice atomically and returns the
    /// post-update record. Fails with `NotFound` if the invoice does not exist.
    async fn update_invoice(
        &self,
        key: &InvoiceKey,
        assignments: &[Assignment],
    ) -> Result<InvoiceRecord>;

    /// Deletes an invoice. Deleting a missing invoice is not an error.
    async fn delete_invoice(&self, key: &InvoiceKey) -> Result<DeleteOutcome>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> Result<()>;
}
