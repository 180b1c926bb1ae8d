//! Key and index attribute generation for the invoice table.
//!
//! Pure functions following the single-table layout. Every index attribute written by
//! create or update is produced here so the write paths cannot drift apart.

use super::ids::{CustomerId, InvoiceId};
use super::types::Status;

// ============================================================================
// Prefixes and constants
// ============================================================================

pub const CUSTOMER_PREFIX: &str = "CUSTOMER-";
pub const INVOICE_PREFIX: &str = "INVOICE-";

/// Separator between the parts of composite sort keys. Never allowed inside a status.
pub const KEY_SEPARATOR: char = '#';

/// Partition value shared by every invoice in the global date index.
pub const GLOBAL_PARTITION: &str = "INVOICE";

// ============================================================================
// Attribute names
// ============================================================================

/// Table partition key.
pub const ATTR_CUSTOMER_ID: &str = "CUSTOMER_ID";
/// Table sort key.
pub const ATTR_INVOICE_ID: &str = "INVOICE_ID";

pub const ATTR_CUSTOMER_INDEX_PK: &str = "CustomerID";
pub const ATTR_STATUS_DATE: &str = "StatusDate";

pub const ATTR_STATUS_PK: &str = "PK_STATUS";
pub const ATTR_STATUS_SK: &str = "SK_DATE";

pub const ATTR_GLOBAL_PK: &str = "PK2_INVOICE";
pub const ATTR_GLOBAL_SK: &str = "SK2_Date";

// ============================================================================
// Key values
// ============================================================================

/// Table partition key for a customer.
///
/// Pattern: `CUSTOMER-<customer_id>`
pub fn customer_pk(customer_id: &CustomerId) -> String {
    format!("{CUSTOMER_PREFIX}{customer_id}")
}

/// Table sort key for an invoice.
///
/// Pattern: `INVOICE-<invoice_id>`
pub fn invoice_sk(invoice_id: &InvoiceId) -> String {
    format!("{INVOICE_PREFIX}{invoice_id}")
}

/// Sort key of the customer index.
///
/// Pattern: `status#<status>#date#<date>`
pub fn status_date_sk(status: &Status, date: &str) -> String {
    format!("{}{date}", status_date_prefix(status))
}

/// Prefix of [`status_date_sk`] covering every date for one status.
///
/// Pattern: `status#<status>#date#`
pub fn status_date_prefix(status: &Status) -> String {
    format!("status#{status}#date#")
}

// ============================================================================
// Secondary indexes
// ============================================================================

/// The three secondary indexes of the invoice table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceIndex {
    /// Customer partition, `status#..#date#..` sort key.
    CustomerStatusDate,
    /// Status partition, date sort key.
    StatusDate,
    /// Constant partition, date sort key. Global recency listing.
    InvoiceDate,
}

impl InvoiceIndex {
    pub const ALL: [InvoiceIndex; 3] = [
        InvoiceIndex::CustomerStatusDate,
        InvoiceIndex::StatusDate,
        InvoiceIndex::InvoiceDate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InvoiceIndex::CustomerStatusDate => "GSI_CustomerIDStatusDate",
            InvoiceIndex::StatusDate => "GSI_PK_STATUS__SK_DATE",
            InvoiceIndex::InvoiceDate => "INVOICE_DATE_INDEX",
        }
    }

    pub fn partition_attribute(self) -> &'static str {
        match self {
            InvoiceIndex::CustomerStatusDate => ATTR_CUSTOMER_INDEX_PK,
            InvoiceIndex::StatusDate => ATTR_STATUS_PK,
            InvoiceIndex::InvoiceDate => ATTR_GLOBAL_PK,
        }
    }

    pub fn sort_attribute(self) -> &'static str {
        match self {
            InvoiceIndex::CustomerStatusDate => ATTR_STATUS_DATE,
            InvoiceIndex::StatusDate => ATTR_STATUS_SK,
            InvoiceIndex::InvoiceDate => ATTR_GLOBAL_SK,
        }
    }

    /// Attributes making up the "last evaluated key" of a query on this index: the
    /// table key followed by the index key.
    pub fn key_attributes(self) -> [&'static str; 4] {
        [
            ATTR_CUSTOMER_ID,
            ATTR_INVOICE_ID,
            self.partition_attribute(),
            self.sort_attribute(),
        ]
    }
}
