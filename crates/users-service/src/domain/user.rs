//! User aggregate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Validation failures for a new user.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("email is required")]
    EmailRequired,

    #[error("email is invalid")]
    EmailInvalid,

    #[error("password must be at least 8 characters")]
    PasswordTooShort,
}

/// A registered user. The password is opaque to this service and treated
/// as a secret: it never appears in events, responses or debug output.
#[derive(Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Normalizes the email (trim + lowercase) and enforces the aggregate
    /// invariants.
    pub fn new(email: &str, password: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.trim().to_lowercase();

        if email.is_empty() {
            return Err(UserValidationError::EmailRequired);
        }
        if !email.contains('@') || !email.contains('.') {
            return Err(UserValidationError::EmailInvalid);
        }

        let password = password.into();
        if password.len() < 8 {
            return Err(UserValidationError::PasswordTooShort);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password,
            created_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let user = User::new("  A@B.com ", "abcdefgh").unwrap();
        assert_eq!(user.email, "a@b.com");
    }

    #[test]
    fn empty_email_is_rejected() {
        assert_eq!(
            User::new("   ", "abcdefgh").unwrap_err(),
            UserValidationError::EmailRequired
        );
    }

    #[test]
    fn email_without_at_or_dot_is_rejected() {
        assert_eq!(
            User::new("not-an-email", "abcdefgh").unwrap_err(),
            UserValidationError::EmailInvalid
        );
        assert_eq!(
            User::new("a@b", "abcdefgh").unwrap_err(),
            UserValidationError::EmailInvalid
        );
    }

    #[test]
    fn short_password_is_rejected() {
        assert_eq!(
            User::new("a@b.com", "1234567").unwrap_err(),
            UserValidationError::PasswordTooShort
        );
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let user = User::new("a@b.com", "super-secret").unwrap();
        let debug = format!("{user:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
