use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::ids::{CustomerId, InvoiceId, InvoiceKey};
use super::keys::{
    customer_pk, invoice_sk, status_date_sk, InvoiceIndex, ATTR_CUSTOMER_ID,
    ATTR_CUSTOMER_INDEX_PK, ATTR_GLOBAL_PK, ATTR_GLOBAL_SK, ATTR_INVOICE_ID, ATTR_STATUS_DATE,
    ATTR_STATUS_PK, ATTR_STATUS_SK, GLOBAL_PARTITION,
};
use super::pagination::PageKey;

/// Invoice status, always held lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Status(String);

impl Status {
    /// Trims and lower-cases a raw status. Idempotent.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Normalizes a caller-supplied status, treating blank input as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        (!raw.trim().is_empty()).then(|| Self::normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(|s| Status::normalize(&s))
    }
}

/// The invoice entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub customer_id: CustomerId,
    pub invoice_id: InvoiceId,
    pub email: String,
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub status: Status,
}

impl Invoice {
    pub fn key(&self) -> InvoiceKey {
        InvoiceKey::new(self.customer_id.clone(), self.invoice_id.clone())
    }
}

/// Table key and index mirror attributes of a stored invoice.
///
/// Each field is a pure function of the [`Invoice`] it belongs to; see
/// [`KeyAttributes::derive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttributes {
    #[serde(rename = "CUSTOMER_ID")]
    pub customer_pk: String,
    #[serde(rename = "INVOICE_ID")]
    pub invoice_sk: String,
    #[serde(rename = "CustomerID")]
    pub customer_index_pk: String,
    #[serde(rename = "StatusDate")]
    pub status_date: String,
    #[serde(rename = "PK_STATUS")]
    pub status_pk: String,
    #[serde(rename = "SK_DATE")]
    pub status_index_date: String,
    #[serde(rename = "PK2_INVOICE")]
    pub global_pk: String,
    #[serde(rename = "SK2_Date")]
    pub global_index_date: String,
}

impl KeyAttributes {
    pub fn derive(invoice: &Invoice) -> Self {
        let customer_pk = customer_pk(&invoice.customer_id);
        Self {
            customer_index_pk: customer_pk.clone(),
            customer_pk,
            invoice_sk: invoice_sk(&invoice.invoice_id),
            status_date: status_date_sk(&invoice.status, &invoice.date),
            status_pk: invoice.status.as_str().to_string(),
            status_index_date: invoice.date.clone(),
            global_pk: GLOBAL_PARTITION.to_string(),
            global_index_date: invoice.date.clone(),
        }
    }

    /// Looks an attribute up by its stored name.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        let value = match attribute {
            ATTR_CUSTOMER_ID => &self.customer_pk,
            ATTR_INVOICE_ID => &self.invoice_sk,
            ATTR_CUSTOMER_INDEX_PK => &self.customer_index_pk,
            ATTR_STATUS_DATE => &self.status_date,
            ATTR_STATUS_PK => &self.status_pk,
            ATTR_STATUS_SK => &self.status_index_date,
            ATTR_GLOBAL_PK => &self.global_pk,
            ATTR_GLOBAL_SK => &self.global_index_date,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn partition_value(&self, index: InvoiceIndex) -> &str {
        match index {
            InvoiceIndex::CustomerStatusDate => &self.customer_index_pk,
            InvoiceIndex::StatusDate => &self.status_pk,
            InvoiceIndex::InvoiceDate => &self.global_pk,
        }
    }

    pub fn sort_value(&self, index: InvoiceIndex) -> &str {
        match index {
            InvoiceIndex::CustomerStatusDate => &self.status_date,
            InvoiceIndex::StatusDate => &self.status_index_date,
            InvoiceIndex::InvoiceDate => &self.global_index_date,
        }
    }
}

/// An invoice as stored: the entity plus its key and mirror attributes.
///
/// This is also the external representation returned by every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(flatten)]
    pub invoice: Invoice,
    #[serde(flatten)]
    pub keys: KeyAttributes,
}

impl InvoiceRecord {
    /// Wraps an invoice, computing every key and mirror attribute.
    pub fn new(invoice: Invoice) -> Self {
        let keys = KeyAttributes::derive(&invoice);
        Self { invoice, keys }
    }

    pub fn key(&self) -> InvoiceKey {
        self.invoice.key()
    }

    /// True when every mirror attribute matches what the invoice fields imply.
    pub fn is_consistent(&self) -> bool {
        self.keys == KeyAttributes::derive(&self.invoice)
    }

    /// The position of this record in a query on `index`, as a resumable page key.
    pub fn page_key(&self, index: InvoiceIndex) -> PageKey {
        index
            .key_attributes()
            .into_iter()
            .filter_map(|attribute| {
                self.keys
                    .get(attribute)
                    .map(|value| (attribute.to_string(), value.to_string()))
            })
            .collect()
    }
}
