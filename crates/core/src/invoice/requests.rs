//! Request and response shapes of the invoice operations.

use serde::{Deserialize, Serialize};

use super::error::{InvoiceError, ValidationError};
use super::ids::{derive_customer_id, generate_invoice_id};
use super::keys::KEY_SEPARATOR;
use super::routing::{ListFilter, PageSize};
use super::types::{Invoice, InvoiceRecord, Status};
use super::update::{UpdatableField, UpdatePlan};
use crate::serde::{deserialize_optional_amount, deserialize_optional_string};

/// Amounts must stay strictly below this magnitude to be storable as a number.
const AMOUNT_MAX_MAGNITUDE: f64 = 1e126;
/// Smallest non-zero magnitude storable as a number.
const AMOUNT_MIN_MAGNITUDE: f64 = 1e-130;

/// Accepts zero and finite amounts within the backing store's number range.
pub fn check_amount(amount: f64) -> Result<f64, ValidationError> {
    let magnitude = amount.abs();
    let storable = amount.is_finite()
        && magnitude < AMOUNT_MAX_MAGNITUDE
        && (magnitude == 0.0 || magnitude >= AMOUNT_MIN_MAGNITUDE);
    if storable {
        Ok(amount)
    } else {
        Err(ValidationError::InvalidAmount)
    }
}

/// Rejects statuses that would break out of the `status#<status>#date#` sort key layout.
pub fn check_status(status: Status) -> Result<Status, ValidationError> {
    if status.as_str().contains(KEY_SEPARATOR) {
        return Err(ValidationError::InvalidStatus(status.to_string()));
    }
    Ok(status)
}

/// Input of create. Every field is required; blank strings count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateInvoiceRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
}

impl CreateInvoiceRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Checks every required field, reporting all missing ones at once.
    pub fn validate(self) -> Result<NewInvoice, ValidationError> {
        let present = |value: Option<String>| value.filter(|s| !s.trim().is_empty());

        let email = present(self.email);
        let name = present(self.name);
        let date = present(self.date);
        let status = self.status.as_deref().and_then(Status::parse);
        let amount = self.amount;

        let mut missing = Vec::new();
        if email.is_none() {
            missing.push("email");
        }
        if name.is_none() {
            missing.push("name");
        }
        if amount.is_none() {
            missing.push("amount");
        }
        if date.is_none() {
            missing.push("date");
        }
        if status.is_none() {
            missing.push("status");
        }

        match (email, name, amount, date, status) {
            (Some(email), Some(name), Some(amount), Some(date), Some(status)) => Ok(NewInvoice {
                email,
                name,
                amount: check_amount(amount)?,
                date,
                status: check_status(status)?,
            }),
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub email: String,
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub status: Status,
}

impl NewInvoice {
    /// Derives the customer id, draws a fresh invoice id and computes every mirror.
    pub fn into_record(self) -> InvoiceRecord {
        InvoiceRecord::new(Invoice {
            customer_id: derive_customer_id(&self.email),
            invoice_id: generate_invoice_id(),
            email: self.email,
            name: self.name,
            amount: self.amount,
            date: self.date,
            status: self.status,
        })
    }
}

/// Input of update. Fields other than `status` and `amount` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoiceRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<f64>,
}

impl UpdateInvoiceRequest {
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn into_plan(self) -> Result<UpdatePlan, InvoiceError> {
        let amount = self
            .amount
            .map(check_amount)
            .transpose()?
            .map(UpdatableField::Amount);
        let status = self
            .status
            .as_deref()
            .and_then(Status::parse)
            .map(check_status)
            .transpose()?
            .map(UpdatableField::Status);

        UpdatePlan::new(status.into_iter().chain(amount))
    }
}

/// Query string of list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Kept raw: page size input is coerced, never rejected.
    #[serde(default)]
    pub page_size: Option<String>,
    #[serde(default, alias = "lastEvaluatedKey")]
    pub cursor: Option<String>,
}

impl ListInvoicesQuery {
    pub fn filter(&self) -> ListFilter {
        let mut filter = ListFilter::new();
        if let Some(status) = &self.status {
            filter = filter.with_status(status);
        }
        if let Some(customer_id) = &self.customer_id {
            filter = filter.with_customer(customer_id);
        }
        filter
    }

    pub fn page_size(&self) -> PageSize {
        PageSize::coerce(self.page_size.as_deref())
    }

    /// The continuation cursor, if a non-blank one was supplied.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor
            .as_deref()
            .map(str::trim)
            .filter(|cursor| !cursor.is_empty())
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePage {
    pub data: Vec<InvoiceRecord>,
    pub count: usize,
    pub page_size: u32,
    /// Present only when more results may follow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}
