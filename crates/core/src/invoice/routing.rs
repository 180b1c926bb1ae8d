//! Index selection for invoice listings.
//!
//! [`route`] turns a filter, a page size and an optional cursor into a [`ListQuery`]
//! descriptor. The descriptor is backend-agnostic; repositories execute it.

use super::error::InvoiceError;
use super::ids::CustomerId;
use super::keys::{customer_pk, status_date_prefix, InvoiceIndex, GLOBAL_PARTITION};
use super::pagination::{self, PageKey};
use super::types::Status;

/// Number of invoices per page.
///
/// Page size input is never rejected. [`PageSize::coerce`] maps absent, blank,
/// non-numeric, fractional, zero and negative values to [`PageSize::DEFAULT`] and clamps
/// anything above [`PageSize::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(u32);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(10);
    pub const MAX: u32 = 100;

    /// Builds a page size from a number, applying the same policy as [`PageSize::coerce`].
    pub fn new(size: u32) -> Self {
        match size {
            0 => Self::DEFAULT,
            n => Self(n.min(Self::MAX)),
        }
    }

    /// Coerces raw query-string input into a page size.
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
            Some(n) if n > 0 => Self::new(u32::try_from(n).unwrap_or(Self::MAX)),
            _ => Self::DEFAULT,
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Listing filter. Both parts are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub status: Option<Status>,
    pub customer_id: Option<CustomerId>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by status. Blank input leaves the filter unset.
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Status::parse(status);
        self
    }

    /// Restricts the listing to one customer. Blank input leaves the filter unset.
    pub fn with_customer(mut self, customer_id: &str) -> Self {
        self.customer_id = CustomerId::parse(customer_id);
        self
    }
}

/// Direction in which the index sort key is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Whether the index is read in ascending order.
    pub fn is_forward(self) -> bool {
        matches!(self, SortOrder::Ascending)
    }
}

/// Key condition on a secondary index: an exact partition match, optionally narrowed by
/// a sort key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    pub partition_attribute: &'static str,
    pub partition_value: String,
    pub sort_attribute: &'static str,
    pub sort_prefix: Option<String>,
}

impl KeyCondition {
    fn on(index: InvoiceIndex, partition_value: String) -> Self {
        Self {
            partition_attribute: index.partition_attribute(),
            partition_value,
            sort_attribute: index.sort_attribute(),
            sort_prefix: None,
        }
    }

    fn with_sort_prefix(mut self, prefix: String) -> Self {
        self.sort_prefix = Some(prefix);
        self
    }

    /// True when an item with the given index key values satisfies this condition.
    pub fn matches(&self, partition_value: &str, sort_value: &str) -> bool {
        partition_value == self.partition_value
            && self
                .sort_prefix
                .as_deref()
                .is_none_or(|prefix| sort_value.starts_with(prefix))
    }
}

/// Everything a repository needs to run one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub index: InvoiceIndex,
    pub condition: KeyCondition,
    pub order: SortOrder,
    pub limit: PageSize,
    pub exclusive_start_key: Option<PageKey>,
}

/// Chooses the index and key condition for a listing.
///
/// - customer filter: customer index, optionally narrowed to one status;
/// - status filter only: status index, partition = the lower-cased status;
/// - no filter: global date index, constant partition.
///
/// Every route reads newest first. A blank cursor counts as no cursor; any other cursor
/// must decode and belong to the chosen index and partition.
pub fn route(
    filter: &ListFilter,
    page_size: PageSize,
    cursor: Option<&str>,
) -> Result<ListQuery, InvoiceError> {
    let (index, condition) = match (&filter.customer_id, &filter.status) {
        (Some(customer_id), status) => {
            let index = InvoiceIndex::CustomerStatusDate;
            let condition = KeyCondition::on(index, customer_pk(customer_id));
            let condition = match status {
                Some(status) => condition.with_sort_prefix(status_date_prefix(status)),
                None => condition,
            };
            (index, condition)
        }
        (None, Some(status)) => {
            let index = InvoiceIndex::StatusDate;
            (index, KeyCondition::on(index, status.as_str().to_string()))
        }
        (None, None) => {
            let index = InvoiceIndex::InvoiceDate;
            (index, KeyCondition::on(index, GLOBAL_PARTITION.to_string()))
        }
    };

    let exclusive_start_key = match cursor.map(str::trim).filter(|c| !c.is_empty()) {
        Some(cursor) => {
            let key = pagination::decode(cursor)?;
            check_start_key(index, &condition, &key)?;
            Some(key)
        }
        None => None,
    };

    Ok(ListQuery {
        index,
        condition,
        order: SortOrder::Descending,
        limit: page_size,
        exclusive_start_key,
    })
}

/// A start key must name exactly the key attributes of `index` and sit inside the
/// partition (and sort prefix) being queried.
fn check_start_key(
    index: InvoiceIndex,
    condition: &KeyCondition,
    key: &PageKey,
) -> Result<(), InvoiceError> {
    let expected = index.key_attributes();
    let shape_matches =
        key.len() == expected.len() && expected.iter().all(|name| key.contains_key(*name));
    if !shape_matches {
        return Err(InvoiceError::MalformedCursor(format!(
            "cursor does not belong to index {}",
            index.name()
        )));
    }

    let partition = &key[condition.partition_attribute];
    let sort = &key[condition.sort_attribute];
    if !condition.matches(partition, sort) {
        return Err(InvoiceError::MalformedCursor(
            "cursor belongs to a different filter".to_string(),
        ));
    }

    Ok(())
}
