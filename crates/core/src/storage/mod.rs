mod error;
mod http_mapping;
mod table;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use http_mapping::invoice_error_to_status_code;
pub use table::{LazyTableName, StaticTableName, TableNameError, TableNameSource};
pub use traits::InvoiceRepository;
pub use types::{DeleteOutcome, QueryPage};
