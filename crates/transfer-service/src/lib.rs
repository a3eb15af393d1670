//! Money-transfer service.
//!
//! Accepts transfer commands over HTTP, persists the transaction and a
//! `TransactionCreated` outbox event in one database transaction, and lets
//! the outbox relay publish the event to the broker asynchronously.

pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;
