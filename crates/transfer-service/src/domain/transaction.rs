//! Transaction aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a transaction.
///
/// Only advances along PENDING → PROCESSING → {COMPLETED, FAILED}. The
/// transitions past PENDING are performed by a downstream processor; this
/// service only ever creates PENDING rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Processing => "PROCESSING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TransactionStatus::Pending),
            "PROCESSING" => Some(TransactionStatus::Processing),
            "COMPLETED" => Some(TransactionStatus::Completed),
            "FAILED" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for a new transaction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransactionValidationError {
    #[error("from_user_id is required")]
    FromUserRequired,

    #[error("to_user_id is required")]
    ToUserRequired,

    #[error("from and to user cannot be the same")]
    SameUser,

    #[error("amount must be greater than zero")]
    NonPositiveAmount,
}

/// A money transfer between two users.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: i64,
    pub description: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub idempotency_key: Option<String>,
}

impl Transaction {
    /// Builds a new PENDING transaction, enforcing the aggregate invariants.
    pub fn new(
        from_user_id: impl Into<String>,
        to_user_id: impl Into<String>,
        amount: i64,
        description: impl Into<String>,
    ) -> Result<Self, TransactionValidationError> {
        let from_user_id = from_user_id.into();
        let to_user_id = to_user_id.into();

        if from_user_id.is_empty() {
            return Err(TransactionValidationError::FromUserRequired);
        }
        if to_user_id.is_empty() {
            return Err(TransactionValidationError::ToUserRequired);
        }
        if from_user_id == to_user_id {
            return Err(TransactionValidationError::SameUser);
        }
        if amount <= 0 {
            return Err(TransactionValidationError::NonPositiveAmount);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            description: description.into(),
            from_user_id,
            to_user_id,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
            idempotency_key: None,
        })
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}
