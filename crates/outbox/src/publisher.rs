//! Broker publisher abstraction.

use std::time::Duration;

use crate::event::OutboxEvent;

/// Error type for broker publish operations.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("broker connection failed: {0}")]
    Connection(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("publish not confirmed within {0:?}")]
    ConfirmTimeout(Duration),
}

/// Publishes a single outbox event to the broker.
///
/// Implementations own the broker connection; callers treat a returned
/// error as "not delivered" and rely on the relay's retry machinery.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &OutboxEvent) -> Result<(), PublishError>;
}
