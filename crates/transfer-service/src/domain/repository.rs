//! Transaction persistence port.

use outbox::NewOutboxEvent;
use outbox_shared::ServiceError;
use uuid::Uuid;

use crate::domain::Transaction;

/// Persistence operations for the transaction aggregate.
///
/// `create` is the outbox write path: the aggregate row and the event are
/// committed in one database transaction, so downstream consumers either
/// see both or neither.
#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(
        &self,
        transaction: &Transaction,
        event: &NewOutboxEvent,
    ) -> Result<(), ServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, ServiceError>;

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<Transaction>, ServiceError>;

    /// Sum of COMPLETED credits minus debits for the user.
    async fn get_balance(&self, user_id: &str) -> Result<i64, ServiceError>;
}
