use crate::invoice::{InvoiceRecord, ListQuery, PageKey};

/// One page of query results, already trimmed to the requested size.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub items: Vec<InvoiceRecord>,
    /// Key of the last returned item, present only when more results may follow.
    pub next: Option<PageKey>,
}

impl QueryPage {
    /// Builds a page from a read of up to `limit + 1` items.
    ///
    /// The extra item only signals that the page is not the last one; it is dropped.
    /// `store_truncated` is set when the backing store itself stopped early (for example
    /// on a response size limit), in which case a cursor is returned even without the
    /// extra item.
    pub fn from_overfetch(
        mut items: Vec<InvoiceRecord>,
        query: &ListQuery,
        store_truncated: bool,
    ) -> Self {
        let limit = query.limit.get() as usize;
        let has_more = items.len() > limit || store_truncated;
        items.truncate(limit);

        let next = if has_more {
            items.last().map(|item| item.page_key(query.index))
        } else {
            None
        };

        Self { items, next }
    }
}

/// What a delete found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}
