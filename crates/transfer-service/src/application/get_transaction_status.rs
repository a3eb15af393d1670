//! Transaction status lookup.

use std::sync::Arc;

use outbox_shared::ServiceError;
use uuid::Uuid;

use crate::domain::{TransactionRepository, TransactionStatus};

#[derive(Debug, Clone)]
pub struct TransactionStatusOutput {
    pub id: Uuid,
    pub status: TransactionStatus,
}

pub struct GetTransactionStatus {
    repo: Arc<dyn TransactionRepository>,
}

impl GetTransactionStatus {
    pub fn new(repo: Arc<dyn TransactionRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: Uuid) -> Result<TransactionStatusOutput, ServiceError> {
        let transaction = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("transaction"))?;

        Ok(TransactionStatusOutput {
            id: transaction.id,
            status: transaction.status,
        })
    }
}
