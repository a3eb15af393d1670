//! Cross-cutting concerns shared by the transfer and users services:
//! the error taxonomy, environment configuration, HTTP response envelopes
//! and shutdown signal handling.

pub mod config;
pub mod error;
pub mod http;
pub mod shutdown;

pub use error::ServiceError;
