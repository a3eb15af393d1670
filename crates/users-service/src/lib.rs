//! User-registration service.
//!
//! Registers users over HTTP, persisting the user row and a `UserCreated`
//! outbox event in one database transaction. The event is published to the
//! broker asynchronously by the outbox relay.

pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;
