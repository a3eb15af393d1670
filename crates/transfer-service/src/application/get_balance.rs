//! Balance lookup over completed transactions.

use std::sync::Arc;

use outbox_shared::ServiceError;

use crate::domain::TransactionRepository;

#[derive(Debug, Clone)]
pub struct BalanceOutput {
    pub user_id: String,
    pub balance: i64,
}

pub struct GetBalance {
    repo: Arc<dyn TransactionRepository>,
}

impl GetBalance {
    pub fn new(repo: Arc<dyn TransactionRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: &str) -> Result<BalanceOutput, ServiceError> {
        if user_id.is_empty() {
            return Err(ServiceError::validation("user id is required"));
        }
        let balance = self.repo.get_balance(user_id).await?;
        Ok(BalanceOutput {
            user_id: user_id.to_string(),
            balance,
        })
    }
}
