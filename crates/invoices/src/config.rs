use std::{env, time::Duration};

#[cfg(any(test, feature = "dynamodb"))]
use async_trait::async_trait;
#[cfg(any(test, feature = "dynamodb"))]
use invoices_core::storage::{TableNameError, TableNameSource};

/// Environment variable holding the invoice table name.
pub const TABLE_NAME_VAR: &str = "INVOICES_TABLE_NAME";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint override for a local DynamoDB (default: none)
    /// Note: Only used when the `dynamodb` feature is enabled.
    #[allow(dead_code)]
    pub aws_endpoint_url: Option<String>,
    /// AWS region (default: "us-east-1")
    #[allow(dead_code)]
    pub aws_region: String,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AWS_ENDPOINT_URL` - DynamoDB endpoint override (default: none)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout in seconds (default: 10)
    ///
    /// The table name is read separately through [`EnvTableName`].
    pub fn from_env() -> Self {
        Self {
            aws_endpoint_url: env::var("AWS_ENDPOINT_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(10),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Table name read from an environment variable when first needed.
///
/// An unset variable falls back to the default; a blank one is a configuration error.
#[cfg(any(test, feature = "dynamodb"))]
#[derive(Debug, Clone)]
pub struct EnvTableName {
    var: &'static str,
    default: &'static str,
}

#[cfg(any(test, feature = "dynamodb"))]
impl EnvTableName {
    pub fn new(var: &'static str, default: &'static str) -> Self {
        Self { var, default }
    }
}

#[cfg(any(test, feature = "dynamodb"))]
impl Default for EnvTableName {
    fn default() -> Self {
        Self::new(TABLE_NAME_VAR, "invoices")
    }
}

#[cfg(any(test, feature = "dynamodb"))]
#[async_trait]
impl TableNameSource for EnvTableName {
    async fn resolve(&self) -> Result<String, TableNameError> {
        match env::var(self.var) {
            Ok(name) if name.trim().is_empty() => Err(TableNameError::Missing(self.var)),
            Ok(name) => Ok(name.trim().to_string()),
            Err(env::VarError::NotPresent) => Ok(self.default.to_string()),
            Err(err) => Err(TableNameError::Lookup(err.to_string())),
        }
    }
}
