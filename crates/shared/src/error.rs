//! Error taxonomy consumed across the stack.
//!
//! A single flat error kind per failure class, mapped to an HTTP status at
//! the adapter boundary. Repositories translate database errors into
//! `Storage` or `Conflict`; they never return raw driver errors upward.

/// Unique-constraint violation, per SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Structured failure value surfaced across the services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed a domain validation rule.
    #[error("{reason}")]
    Validation { reason: String },

    /// Aggregate lookup miss.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Unique-constraint collision (duplicate id, idempotency key or email).
    #[error("{detail}")]
    Conflict { detail: String },

    /// Any other database failure. The cause is logged, never sent to clients.
    #[error("database error")]
    Storage(#[source] sqlx::Error),

    /// Broker publish failed or timed out. Never surfaced to HTTP clients.
    #[error("broker error: {detail}")]
    Broker { detail: String },

    #[error("{detail}")]
    Unexpected { detail: String },
}

impl ServiceError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict {
            detail: detail.into(),
        }
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected {
            detail: detail.into(),
        }
    }

    /// True when the error came from a unique-constraint collision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Classifies driver errors: unique violations become `Conflict`, everything
/// else becomes `Storage`.
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return ServiceError::Conflict {
                    detail: format!("duplicate key: {}", db.constraint().unwrap_or("unknown")),
                };
            }
        }
        ServiceError::Storage(err)
    }
}
