//! Repository whose every call fails, for exercising error paths.

use async_trait::async_trait;

use invoices_core::invoice::{Assignment, InvoiceKey, InvoiceRecord, ListQuery};
use invoices_core::storage::{DeleteOutcome, InvoiceRepository, QueryPage, RepositoryError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRepository;

#[async_trait]
impl InvoiceRepository for FailingRepository {
    async fn get_invoice(&self, _key: &InvoiceKey) -> Result<Option<InvoiceRecord>> {
        Err(RepositoryError::QueryFailed("throttled".to_string()))
    }

    async fn query_invoices(&self, _query: &ListQuery) -> Result<QueryPage> {
        Err(RepositoryError::QueryFailed("throttled".to_string()))
    }

    async fn create_invoice(&self, record: &InvoiceRecord) -> Result<()> {
        Err(RepositoryError::AlreadyExists {
            entity_type: "Invoice",
            id: record.key().to_string(),
        })
    }

    async fn update_invoice(
        &self,
        _key: &InvoiceKey,
        _assignments: &[Assignment],
    ) -> Result<InvoiceRecord> {
        Err(RepositoryError::QueryFailed("throttled".to_string()))
    }

    async fn delete_invoice(&self, _key: &InvoiceKey) -> Result<DeleteOutcome> {
        Err(RepositoryError::QueryFailed("throttled".to_string()))
    }

    async fn ping(&self) -> Result<()> {
        Err(RepositoryError::ConnectionFailed(
            "table invoices unreachable at 10.0.0.1".to_string(),
        ))
    }
}
