//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use invoices_core::invoice::{
    Assignment, InvoiceKey, InvoiceRecord, ListQuery, SortOrder, ATTR_CUSTOMER_ID,
    ATTR_INVOICE_ID,
};
use invoices_core::storage::{
    DeleteOutcome, InvoiceRepository, QueryPage, RepositoryError, Result,
};

const ENTITY_TYPE: &str = "Invoice";

/// Position of a record in an index: sort key first, table key as tie-breaker.
type IndexPosition = (String, String, String);

/// In-memory storage backend for testing.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    invoices: Arc<RwLock<HashMap<InvoiceKey, InvoiceRecord>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn position(record: &InvoiceRecord, query: &ListQuery) -> IndexPosition {
    (
        record.keys.sort_value(query.index).to_string(),
        record.keys.customer_pk.clone(),
        record.keys.invoice_sk.clone(),
    )
}

fn start_position(query: &ListQuery) -> Option<IndexPosition> {
    let key = query.exclusive_start_key.as_ref()?;
    Some((
        key.get(query.condition.sort_attribute)?.clone(),
        key.get(ATTR_CUSTOMER_ID)?.clone(),
        key.get(ATTR_INVOICE_ID)?.clone(),
    ))
}

#[async_trait]
impl InvoiceRepository for InMemoryRepository {
    async fn get_invoice(&self, key: &InvoiceKey) -> Result<Option<InvoiceRecord>> {
        let invoices = self.invoices.read().await;
        Ok(invoices.get(key).cloned())
    }

    async fn query_invoices(&self, query: &ListQuery) -> Result<QueryPage> {
        let invoices = self.invoices.read().await;

        let mut matching: Vec<(IndexPosition, &InvoiceRecord)> = invoices
            .values()
            .filter(|record| {
                query.condition.matches(
                    record.keys.partition_value(query.index),
                    record.keys.sort_value(query.index),
                )
            })
            .map(|record| (position(record, query), record))
            .collect();

        match query.order {
            SortOrder::Ascending => matching.sort_by(|a, b| a.0.cmp(&b.0)),
            SortOrder::Descending => matching.sort_by(|a, b| b.0.cmp(&a.0)),
        }

        let start = start_position(query);
        let forward = query.order.is_forward();
        let limit = query.limit.get() as usize;

        let items: Vec<InvoiceRecord> = matching
            .into_iter()
            .filter(|(pos, _)| match &start {
                Some(start) if forward => pos > start,
                Some(start) => pos < start,
                None => true,
            })
            .take(limit + 1)
            .map(|(_, record)| record.clone())
            .collect();

        Ok(QueryPage::from_overfetch(items, query, false))
    }

    async fn create_invoice(&self, record: &InvoiceRecord) -> Result<()> {
        let mut invoices = self.invoices.write().await;
        let key = record.key();
        if invoices.contains_key(&key) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: ENTITY_TYPE,
                id: key.to_string(),
            });
        }
        invoices.insert(key, record.clone());
        Ok(())
    }

    async fn update_invoice(
        &self,
        key: &InvoiceKey,
        assignments: &[Assignment],
    ) -> Result<InvoiceRecord> {
        let mut invoices = self.invoices.write().await;
        let record = invoices
            .get_mut(key)
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: ENTITY_TYPE,
                id: key.to_string(),
            })?;

        for assignment in assignments {
            assignment.apply_to(record);
        }
        Ok(record.clone())
    }

    async fn delete_invoice(&self, key: &InvoiceKey) -> Result<DeleteOutcome> {
        let mut invoices = self.invoices.write().await;
        Ok(match invoices.remove(key) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::AlreadyAbsent,
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
