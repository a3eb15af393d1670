//! Outbox event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of an outbox event.
///
/// Transitions: PENDING → PROCESSING → {PROCESSED, FAILED, PENDING (retry)}.
/// A crashed worker leaves rows in PROCESSING; the recovery sweep returns
/// them to PENDING after a grace interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboxStatus {
    /// Created, waiting to be claimed by a relay worker.
    Pending,
    /// Claimed by exactly one worker, publish in flight.
    Processing,
    /// Published and acknowledged. Terminal.
    Processed,
    /// Retries exhausted. Terminal.
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "PENDING",
            OutboxStatus::Processing => "PROCESSING",
            OutboxStatus::Processed => "PROCESSED",
            OutboxStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OutboxStatus::Pending),
            "PROCESSING" => Some(OutboxStatus::Processing),
            "PROCESSED" => Some(OutboxStatus::Processed),
            "FAILED" => Some(OutboxStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbox event ready for insertion.
///
/// The event id doubles as the broker message id, so consumers can
/// deduplicate redeliveries. The aggregate id is carried separately in the
/// `aggregate_id` message header; the two are independent so an aggregate
/// can emit more than one event.
#[derive(Debug, Clone)]
pub struct NewOutboxEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
}

impl NewOutboxEvent {
    pub fn new(
        aggregate_id: Uuid,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggregate_id,
            event_type: event_type.into(),
            payload,
        }
    }
}

/// A stored outbox event as read back from the database.
#[derive(Debug, Clone)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub retry_count: i32,
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl OutboxEvent {
    pub fn is_pending(&self) -> bool {
        matches!(self.status, OutboxStatus::Pending)
    }

    pub fn is_processed(&self) -> bool {
        matches!(self.status, OutboxStatus::Processed)
    }

    /// Age since creation.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_database_strings() {
        for status in [
            OutboxStatus::Pending,
            OutboxStatus::Processing,
            OutboxStatus::Processed,
            OutboxStatus::Failed,
        ] {
            assert_eq!(OutboxStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OutboxStatus::parse("PUBLISHED"), None);
    }

    #[test]
    fn new_event_keeps_aggregate_and_event_ids_distinct() {
        let aggregate_id = Uuid::new_v4();
        let event = NewOutboxEvent::new(
            aggregate_id,
            "TransactionCreated",
            serde_json::json!({"transactionId": aggregate_id}),
        );

        assert_eq!(event.aggregate_id, aggregate_id);
        assert_ne!(event.id, aggregate_id);
        assert_eq!(event.event_type, "TransactionCreated");
    }
}
