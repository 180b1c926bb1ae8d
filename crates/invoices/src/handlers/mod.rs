pub mod error;
pub mod health;
pub mod invoices;

pub use error::AppError;
