pub mod create_transaction;
pub mod get_balance;
pub mod get_transaction_status;

pub use create_transaction::{CreateTransaction, CreateTransactionInput, CreateTransactionOutput};
pub use get_balance::{BalanceOutput, GetBalance};
pub use get_transaction_status::{GetTransactionStatus, TransactionStatusOutput};
