//! Create-user use case.

use std::sync::Arc;

use outbox::NewOutboxEvent;
use outbox_shared::ServiceError;
use tracing::info;
use uuid::Uuid;

use crate::domain::{User, UserRepository};

pub const USER_CREATED: &str = "UserCreated";

#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct CreateUserOutput {
    pub id: Uuid,
}

pub struct CreateUser {
    repo: Arc<dyn UserRepository>,
}

impl CreateUser {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: CreateUserInput) -> Result<CreateUserOutput, ServiceError> {
        let user = User::new(&input.email, input.password)
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        // The event snapshot carries the identity only; the password is a
        // secret and never leaves the users table.
        let payload = serde_json::json!({
            "userId": user.id,
            "email": user.email,
        });
        let event = NewOutboxEvent::new(user.id, USER_CREATED, payload);

        self.repo.create(&user, &event).await?;

        info!(user_id = %user.id, event_id = %event.id, "user created");

        Ok(CreateUserOutput { id: user.id })
    }
}
