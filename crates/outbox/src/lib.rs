//! Transactional outbox library shared by the services.
//!
//! Events are appended to a database table inside the same transaction as
//! the business write, then drained into an AMQP broker by a polling relay
//! worker. Delivery is at-least-once; consumers deduplicate on the message
//! id carried by every published event.

pub mod event;
pub mod postgres;
pub mod publisher;
pub mod rabbit;
pub mod relay;
pub mod store;

pub use event::{NewOutboxEvent, OutboxEvent, OutboxStatus};
pub use postgres::PgOutboxStore;
pub use publisher::{EventPublisher, PublishError};
pub use rabbit::{RabbitConfig, RabbitPublisher};
pub use relay::{OutboxRelay, RelayConfig, RelayMetricsSnapshot};
pub use store::{OutboxError, OutboxStats, OutboxStore, OutboxStoreTx};
