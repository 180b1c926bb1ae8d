//! Resolution of the backing table's name.
//!
//! The name is resolved once per process. Concurrent first callers wait on the same
//! resolution; a failed resolution is not cached.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Errors that can occur while resolving the table name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableNameError {
    #[error("Table name not configured: {0}")]
    Missing(&'static str),
    #[error("Table name lookup failed: {0}")]
    Lookup(String),
}

/// Where the table name comes from.
#[async_trait]
pub trait TableNameSource: Send + Sync {
    async fn resolve(&self) -> Result<String, TableNameError>;
}

/// A table name known up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTableName(String);

impl StaticTableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[async_trait]
impl TableNameSource for StaticTableName {
    async fn resolve(&self) -> Result<String, TableNameError> {
        Ok(self.0.clone())
    }
}

/// Resolve-once wrapper around a [`TableNameSource`].
pub struct LazyTableName {
    source: Box<dyn TableNameSource>,
    cell: OnceCell<String>,
}

impl LazyTableName {
    pub fn new(source: impl TableNameSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cell: OnceCell::new(),
        }
    }

    /// Returns the table name, resolving it on first use.
    pub async fn get(&self) -> Result<&str, TableNameError> {
        self.cell
            .get_or_try_init(|| self.source.resolve())
            .await
            .map(String::as_str)
    }
}

impl std::fmt::Debug for LazyTableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyTableName")
            .field("resolved", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    /// Counts resolutions and fails the first `failures` of them.
    struct CountingSource {
        calls: AtomicUsize,
        failures: usize,
    }

    impl CountingSource {
        fn new(failures: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
            }
        }
    }

    #[async_trait]
    impl TableNameSource for Arc<CountingSource> {
        async fn resolve(&self) -> Result<String, TableNameError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if call < self.failures {
                return Err(TableNameError::Lookup(format!("attempt {call}")));
            }
            Ok("invoices".to_string())
        }
    }

    #[tokio::test]
    async fn test_static_table_name() {
        let lazy = LazyTableName::new(StaticTableName::new("invoices-test"));
        assert_eq!(lazy.get().await.unwrap(), "invoices-test");
    }

    #[tokio::test]
    async fn test_concurrent_first_use_resolves_once() {
        let source = Arc::new(CountingSource::new(0));
        let lazy = Arc::new(LazyTableName::new(source.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let lazy = lazy.clone();
                tokio::spawn(async move { lazy.get().await.map(str::to_string) })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "invoices");
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_resolution_is_retried() {
        let source = Arc::new(CountingSource::new(1));
        let lazy = LazyTableName::new(source.clone());

        assert_eq!(
            lazy.get().await,
            Err(TableNameError::Lookup("attempt 0".to_string()))
        );
        assert_eq!(lazy.get().await.unwrap(), "invoices");
        assert_eq!(lazy.get().await.unwrap(), "invoices");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
