//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. The storage backend behind the [`InvoiceStore`] is chosen
//! at compile time via feature flags.

use std::sync::Arc;

use invoices_core::storage::InvoiceRepository;

use crate::config::Config;
use crate::store::InvoiceStore;

/// Shared application state.
///
/// This is cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    /// Invoice operations over the configured backend.
    pub store: InvoiceStore,
    /// Per-request timeout applied by the router.
    pub request_timeout: std::time::Duration,
}

impl AppState {
    fn build(repo: Arc<dyn InvoiceRepository>, config: &Config) -> Self {
        Self {
            store: InvoiceStore::new(repo),
            request_timeout: config.request_timeout(),
        }
    }
}

// ============================================================================
// Factory functions for the different backends
// ============================================================================

#[cfg(feature = "inmemory")]
mod inmemory_backend {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Self::build(Arc::new(InMemoryRepository::new()), config))
        }
    }
}

#[cfg(feature = "dynamodb")]
mod dynamodb_backend {
    use super::*;
    use crate::config::EnvTableName;
    use crate::storage::DynamoDbRepository;

    impl AppState {
        /// Creates AppState with DynamoDB storage.
        ///
        /// The table name is resolved here so a misconfiguration fails start-up.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()));
            if let Some(endpoint) = &config.aws_endpoint_url {
                loader = loader.endpoint_url(endpoint);
            }
            let aws_config = loader.load().await;
            let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);

            let dynamodb_repo = DynamoDbRepository::new(dynamodb_client, EnvTableName::default());
            let table_name = dynamodb_repo.table_name().await?;
            tracing::info!(
                table = table_name,
                region = %config.aws_region,
                endpoint = ?config.aws_endpoint_url,
                "Using DynamoDB storage"
            );

            Ok(Self::build(Arc::new(dynamodb_repo), config))
        }
    }
}

// ============================================================================
// Test support - provides Default implementation for unit tests
// ============================================================================
