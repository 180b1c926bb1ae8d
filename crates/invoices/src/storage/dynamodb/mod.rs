//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of [`InvoiceRepository`]
//! using `aws-sdk-dynamodb`.
//!
//! [`InvoiceRepository`]: invoices_core::storage::InvoiceRepository

mod conversions;
mod error;
mod repository;

pub use repository::DynamoDbRepository;
