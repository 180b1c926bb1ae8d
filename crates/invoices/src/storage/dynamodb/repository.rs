//! DynamoDB repository implementation.
//!
//! Implements [`InvoiceRepository`] on a single table with three global secondary
//! indexes. Each trait call issues exactly one DynamoDB request.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::ReturnValue;
use aws_sdk_dynamodb::Client;

use invoices_core::invoice::{Assignment, InvoiceKey, InvoiceRecord, ListQuery, ATTR_CUSTOMER_ID};
use invoices_core::storage::{
    DeleteOutcome, InvoiceRepository, LazyTableName, QueryPage, RepositoryError, Result,
    TableNameSource,
};

use super::conversions::{
    item_to_page_key, item_to_record, key_condition_expression, key_to_item, page_key_to_item,
    record_to_item, update_expression, CREATE_CONDITION, UPDATE_CONDITION,
};
use super::error::{
    map_delete_item_error, map_describe_table_error, map_get_item_error, map_put_item_error,
    map_query_error, map_update_item_error,
};

const ENTITY_TYPE: &str = "Invoice";

/// DynamoDB-based repository implementation.
pub struct DynamoDbRepository {
    client: Client,
    table: LazyTableName,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name source.
    ///
    /// The table name is resolved on first use; see [`DynamoDbRepository::table_name`].
    pub fn new(client: Client, table: impl TableNameSource + 'static) -> Self {
        Self {
            client,
            table: LazyTableName::new(table),
        }
    }

    /// Resolves the table name, or returns the one already resolved.
    pub async fn table_name(&self) -> Result<&str> {
        Ok(self.table.get().await?)
    }
}

#[async_trait]
impl InvoiceRepository for DynamoDbRepository {
    async fn get_invoice(&self, key: &InvoiceKey) -> Result<Option<InvoiceRecord>> {
        let result = self
            .client
            .get_item()
            .table_name(self.table_name().await?)
            .set_key(Some(key_to_item(key)))
            .send()
            .await
            .map_err(map_get_item_error)?;

        match result.item {
            Some(item) => Ok(Some(item_to_record(&item)?)),
            None => Ok(None),
        }
    }

    async fn query_invoices(&self, query: &ListQuery) -> Result<QueryPage> {
        let condition = key_condition_expression(&query.condition);
        // One extra item tells whether another page follows.
        let limit = i32::try_from(query.limit.get() + 1)
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let result = self
            .client
            .query()
            .table_name(self.table_name().await?)
            .index_name(query.index.name())
            .key_condition_expression(condition.text)
            .set_expression_attribute_names(Some(condition.names))
            .set_expression_attribute_values(Some(condition.values))
            .scan_index_forward(query.order.is_forward())
            .limit(limit)
            .set_exclusive_start_key(query.exclusive_start_key.as_ref().map(page_key_to_item))
            .send()
            .await
            .map_err(map_query_error)?;

        let store_truncated = match &result.last_evaluated_key {
            Some(key) => {
                // The cursor is rebuilt from the last kept item; only the shape is checked.
                item_to_page_key(key)?;
                true
            }
            None => false,
        };

        let items = result
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_record)
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryPage::from_overfetch(items, query, store_truncated))
    }

    async fn create_invoice(&self, record: &InvoiceRecord) -> Result<()> {
        self.client
            .put_item()
            .table_name(self.table_name().await?)
            .set_item(Some(record_to_item(record)))
            .condition_expression(CREATE_CONDITION)
            .expression_attribute_names("#pk", ATTR_CUSTOMER_ID)
            .send()
            .await
            .map_err(|e| map_put_item_error(e, ENTITY_TYPE, record.key().to_string()))?;

        Ok(())
    }

    async fn update_invoice(
        &self,
        key: &InvoiceKey,
        assignments: &[Assignment],
    ) -> Result<InvoiceRecord> {
        let expression = update_expression(assignments);

        let result = self
            .client
            .update_item()
            .table_name(self.table_name().await?)
            .set_key(Some(key_to_item(key)))
            .update_expression(expression.text)
            .condition_expression(UPDATE_CONDITION)
            .set_expression_attribute_names(Some(expression.names))
            .set_expression_attribute_values(Some(expression.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| map_update_item_error(e, ENTITY_TYPE, key.to_string()))?;

        let attributes = result.attributes.ok_or_else(|| {
            RepositoryError::InvalidData("UpdateItem returned no attributes".to_string())
        })?;
        item_to_record(&attributes)
    }

    async fn delete_invoice(&self, key: &InvoiceKey) -> Result<DeleteOutcome> {
        let result = self
            .client
            .delete_item()
            .table_name(self.table_name().await?)
            .set_key(Some(key_to_item(key)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(match result.attributes {
            Some(attributes) if !attributes.is_empty() => DeleteOutcome::Deleted,
            _ => DeleteOutcome::AlreadyAbsent,
        })
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .describe_table()
            .table_name(self.table_name().await?)
            .send()
            .await
            .map_err(map_describe_table_error)?;

        Ok(())
    }
}
