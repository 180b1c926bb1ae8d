mod error;
mod ids;
mod keys;
pub mod pagination;
mod requests;
pub mod routing;
mod types;
mod update;

pub use error::{InvoiceError, ValidationError};
pub use ids::{
    derive_customer_id, generate_invoice_id, CustomerId, InvoiceId, InvoiceKey, ID_HEX_LEN,
};
pub use keys::{
    customer_pk, invoice_sk, status_date_prefix, status_date_sk, InvoiceIndex, ATTR_CUSTOMER_ID,
    ATTR_CUSTOMER_INDEX_PK, ATTR_GLOBAL_PK, ATTR_GLOBAL_SK, ATTR_INVOICE_ID, ATTR_STATUS_DATE,
    ATTR_STATUS_PK, ATTR_STATUS_SK, CUSTOMER_PREFIX, GLOBAL_PARTITION, INVOICE_PREFIX,
    KEY_SEPARATOR,
};
pub use pagination::PageKey;
pub use requests::{
    check_amount, check_status, CreateInvoiceRequest, InvoicePage, ListInvoicesQuery, NewInvoice,
    UpdateInvoiceRequest,
};
pub use routing::{route, KeyCondition, ListFilter, ListQuery, PageSize, SortOrder};
pub use types::{Invoice, InvoiceRecord, KeyAttributes, Status};
pub use update::{Assignment, UpdatableField, UpdatePlan};
