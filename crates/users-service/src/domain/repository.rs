//! User persistence port.

use outbox::NewOutboxEvent;
use outbox_shared::ServiceError;

use crate::domain::User;

/// Persistence operations for the user aggregate. `create` commits the
/// user row and its outbox event in one database transaction.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User, event: &NewOutboxEvent) -> Result<(), ServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
}
