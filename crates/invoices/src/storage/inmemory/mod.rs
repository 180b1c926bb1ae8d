//! In-memory storage backend for testing.
//!
//! This module provides an in-memory implementation of [`InvoiceRepository`] that keeps
//! every record in a HashMap wrapped in `Arc<RwLock<_>>` and emulates the secondary
//! indexes by scanning. This is useful for testing and local development where
//! persistence is not required.
//!
//! [`InvoiceRepository`]: invoices_core::storage::InvoiceRepository
//!
//! # Example
//!
//! ```rust,ignore
//! use invoices::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
