pub mod repository;
pub mod transaction;

pub use repository::TransactionRepository;
pub use transaction::{Transaction, TransactionStatus, TransactionValidationError};
