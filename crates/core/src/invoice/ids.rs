//! Customer and invoice identifiers.
//!
//! The customer id is part of the public contract: clients recompute it from an email
//! to look invoices up, so the hash and truncation rule below must never change.
//!
//! - customer id: SHA-256 over the UTF-8 bytes of the email exactly as given (no trimming,
//!   no case folding), lower-case hex, first 24 characters.
//! - invoice id: 12 bytes from the thread-local CSPRNG, lower-case hex (24 characters).

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::ValidationError;
use super::keys::{CUSTOMER_PREFIX, INVOICE_PREFIX};

/// Length in hex characters of both customer and invoice identifiers.
pub const ID_HEX_LEN: usize = 24;

const INVOICE_ID_BYTES: usize = ID_HEX_LEN / 2;

/// Identifier of a customer, derived from their email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Parses a customer id as supplied by a caller.
    ///
    /// Accepts both the bare id and the stored `CUSTOMER-<id>` form. Returns `None` for
    /// blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let id = raw.strip_prefix(CUSTOMER_PREFIX).unwrap_or(raw);
        (!id.is_empty()).then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a single invoice within a customer's invoice set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    /// Parses an invoice id, accepting the bare id and the stored `INVOICE-<id>` form.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let id = raw.strip_prefix(INVOICE_PREFIX).unwrap_or(raw);
        (!id.is_empty()).then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the customer id for an email.
pub fn derive_customer_id(email: &str) -> CustomerId {
    let mut id = hex::encode(Sha256::digest(email.as_bytes()));
    id.truncate(ID_HEX_LEN);
    CustomerId(id)
}

/// Generates a fresh random invoice id.
///
/// Uniqueness is assumed from the size of the space (96 bits), not checked.
pub fn generate_invoice_id() -> InvoiceId {
    let mut bytes = [0u8; INVOICE_ID_BYTES];
    rand::rng().fill(&mut bytes);
    InvoiceId(hex::encode(bytes))
}

/// Primary key of an invoice record. Immutable once the record exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceKey {
    pub customer_id: CustomerId,
    pub invoice_id: InvoiceId,
}

impl InvoiceKey {
    pub fn new(customer_id: CustomerId, invoice_id: InvoiceId) -> Self {
        Self {
            customer_id,
            invoice_id,
        }
    }

    /// Builds a key from caller-supplied strings, naming every blank component.
    pub fn parse(customer_id: &str, invoice_id: &str) -> Result<Self, ValidationError> {
        let customer = CustomerId::parse(customer_id);
        let invoice = InvoiceId::parse(invoice_id);

        match (customer, invoice) {
            (Some(customer_id), Some(invoice_id)) => Ok(Self::new(customer_id, invoice_id)),
            (customer, invoice) => {
                let mut missing = Vec::new();
                if customer.is_none() {
                    missing.push("customerId");
                }
                if invoice.is_none() {
                    missing.push("invoiceId");
                }
                Err(ValidationError::MissingFields(missing))
            }
        }
    }
}

impl fmt::Display for InvoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.customer_id, self.invoice_id)
    }
}
