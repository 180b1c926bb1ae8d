//! Functional core of the invoices data-access layer.
//!
//! Everything in this crate is pure except for the [`storage::InvoiceRepository`] seam
//! and the resolve-once table name cell: key derivation, index routing, cursor
//! encoding and partial-update composition never perform I/O.

pub mod invoice;
pub mod serde;
pub mod storage;
