//! Outbox store abstractions.

use std::time::Duration;

use sqlx::PgTransaction;
use uuid::Uuid;

use crate::event::{NewOutboxEvent, OutboxEvent};

/// Error type for outbox store operations.
#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("duplicate event id: {0}")]
    DuplicateEvent(Uuid),

    #[error("event not found: {0}")]
    NotFound(Uuid),

    #[error("invalid outbox row: {message}")]
    InvalidRow { message: String },
}

/// Relay-facing store operations.
///
/// `claim_pending` is the only coordination primitive between concurrent
/// relay instances: the sets it returns to concurrent callers are disjoint.
#[async_trait::async_trait]
pub trait OutboxStore: Send + Sync {
    /// Atomically selects up to `limit` PENDING events in `created_at`
    /// order and flips them to PROCESSING. Events whose `next_attempt_at`
    /// lies in the future are skipped.
    async fn claim_pending(&self, limit: usize) -> Result<Vec<OutboxEvent>, OutboxError>;

    /// Marks a published event PROCESSED and stamps `processed_at`.
    async fn mark_processed(&self, id: Uuid) -> Result<(), OutboxError>;

    /// Returns a claimed event to PENDING with an incremented retry count
    /// and a backoff gate of `delay` before the next attempt.
    async fn mark_for_retry(
        &self,
        id: Uuid,
        error: &str,
        delay: Duration,
    ) -> Result<(), OutboxError>;

    /// Terminates an event at FAILED after its retries are exhausted.
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), OutboxError>;

    /// Recovery sweep: returns PROCESSING rows untouched for longer than
    /// `grace` back to PENDING. Covers worker crashes mid-batch.
    async fn release_stuck(&self, grace: Duration) -> Result<u64, OutboxError>;

    async fn count_pending(&self) -> Result<u64, OutboxError>;

    async fn stats(&self) -> Result<OutboxStats, OutboxError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OutboxEvent>, OutboxError>;
}

/// Transaction-aware store operations.
///
/// `append` is called by the business repositories inside the same database
/// transaction as the aggregate insert, which is the whole point of the
/// outbox pattern: the aggregate and its event commit or roll back together.
#[async_trait::async_trait]
pub trait OutboxStoreTx: Send + Sync {
    async fn append(
        &self,
        tx: &mut PgTransaction<'_>,
        event: &NewOutboxEvent,
    ) -> Result<(), OutboxError>;
}

/// Counts by status, for logging and alerting.
#[derive(Debug, Clone)]
pub struct OutboxStats {
    pub pending: u64,
    pub processing: u64,
    pub processed: u64,
    pub failed: u64,
    pub oldest_pending_age_seconds: Option<i64>,
}

impl OutboxStats {
    pub fn total(&self) -> u64 {
        self.pending + self.processing + self.processed + self.failed
    }

    pub fn has_backlog(&self) -> bool {
        self.pending > 0 || self.processing > 0
    }
}
