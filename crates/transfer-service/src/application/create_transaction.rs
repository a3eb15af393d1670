//! Create-transaction use case.
//!
//! Validates the command, builds the aggregate and its outbox event, and
//! persists both atomically. The broker is never called from here: publish
//! latency is decoupled from the client response by design.

use std::sync::Arc;

use outbox::NewOutboxEvent;
use outbox_shared::ServiceError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionRepository, TransactionStatus};

pub const TRANSACTION_CREATED: &str = "TransactionCreated";

#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub from_user_id: String,
    pub to_user_id: String,
    pub amount: i64,
    pub description: String,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateTransactionOutput {
    pub id: Uuid,
    pub status: TransactionStatus,
    /// True when the idempotency key matched an existing transaction and
    /// nothing was written.
    pub idempotent: bool,
}

pub struct CreateTransaction {
    repo: Arc<dyn TransactionRepository>,
}

impl CreateTransaction {
    pub fn new(repo: Arc<dyn TransactionRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        input: CreateTransactionInput,
    ) -> Result<CreateTransactionOutput, ServiceError> {
        if let Some(key) = input.idempotency_key.as_deref() {
            if let Some(existing) = self.repo.find_by_idempotency_key(key).await? {
                debug!(transaction_id = %existing.id, "idempotency key matched, skipping write");
                return Ok(CreateTransactionOutput {
                    id: existing.id,
                    status: existing.status,
                    idempotent: true,
                });
            }
        }

        let transaction = Transaction::new(
            input.from_user_id,
            input.to_user_id,
            input.amount,
            input.description,
        )
        .map_err(|e| ServiceError::validation(e.to_string()))?;

        let transaction = match input.idempotency_key {
            Some(key) => transaction.with_idempotency_key(key),
            None => transaction,
        };

        let payload = serde_json::json!({
            "transactionId": transaction.id,
            "fromUserId": transaction.from_user_id,
            "toUserId": transaction.to_user_id,
            "amount": transaction.amount,
            "description": transaction.description,
        });
        let event = NewOutboxEvent::new(transaction.id, TRANSACTION_CREATED, payload);

        self.repo.create(&transaction, &event).await?;

        info!(
            transaction_id = %transaction.id,
            event_id = %event.id,
            "transaction created"
        );

        Ok(CreateTransactionOutput {
            id: transaction.id,
            status: transaction.status,
            idempotent: false,
        })
    }
}
