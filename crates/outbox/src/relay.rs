//! Outbox relay worker.
//!
//! Polls the outbox store, claims a batch of pending events, publishes each
//! to the broker in claim order and advances the event state machine. A
//! publish failure is local to one event: the event returns to PENDING with
//! a backoff (or terminates at FAILED once retries are exhausted) and the
//! batch continues. Rows left PROCESSING by a crashed worker are returned
//! to PENDING by a periodic recovery sweep.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::event::OutboxEvent;
use crate::publisher::{EventPublisher, PublishError};
use crate::store::OutboxStore;

/// Configuration for the outbox relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximum number of events claimed per poll.
    pub batch_size: usize,
    /// How often to poll for pending events.
    pub poll_interval: Duration,
    /// Per-event deadline for publish plus confirmation.
    pub publish_timeout: Duration,
    /// Attempts before an event terminates at FAILED.
    pub max_retries: i32,
    /// Base delay written into `next_attempt_at` after a failed publish.
    pub retry_delay: Duration,
    /// Upper bound for the retry backoff.
    pub max_retry_delay: Duration,
    /// How often the recovery sweep runs.
    pub sweep_interval: Duration,
    /// How long a row may sit in PROCESSING before the sweep reclaims it.
    pub stuck_grace: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            poll_interval: Duration::from_millis(500),
            publish_timeout: Duration::from_secs(5),
            max_retries: 5,
            retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(300),
            stuck_grace: Duration::from_secs(120),
        }
    }
}

/// Counters kept by the relay, surfaced through logs.
#[derive(Debug, Default)]
struct RelayMetrics {
    published_total: u64,
    failed_total: u64,
    retried_total: u64,
    dead_lettered_total: u64,
    swept_total: u64,
    batches_total: u64,
}

/// Point-in-time copy of the relay counters.
#[derive(Debug, Clone)]
pub struct RelayMetricsSnapshot {
    pub published_total: u64,
    pub failed_total: u64,
    pub retried_total: u64,
    pub dead_lettered_total: u64,
    pub swept_total: u64,
    pub batches_total: u64,
}

/// The relay worker. Generic over the store and publisher so the loop can
/// be exercised without a database or broker.
pub struct OutboxRelay<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
    config: RelayConfig,
    metrics: Mutex<RelayMetrics>,
}

impl<S, P> OutboxRelay<S, P>
where
    S: OutboxStore,
    P: EventPublisher,
{
    pub fn new(store: Arc<S>, publisher: Arc<P>, config: RelayConfig) -> Self {
        Self {
            store,
            publisher,
            config,
            metrics: Mutex::new(RelayMetrics::default()),
        }
    }

    pub fn metrics(&self) -> RelayMetricsSnapshot {
        let metrics = self.metrics.lock().unwrap();
        RelayMetricsSnapshot {
            published_total: metrics.published_total,
            failed_total: metrics.failed_total,
            retried_total: metrics.retried_total,
            dead_lettered_total: metrics.dead_lettered_total,
            swept_total: metrics.swept_total,
            batches_total: metrics.batches_total,
        }
    }

    /// Runs the relay until `shutdown` is cancelled.
    ///
    /// On shutdown the event currently being processed is finished (so a
    /// published event is still marked), no further events are claimed, and
    /// any remaining claimed rows are left for the recovery sweep.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            batch_size = self.config.batch_size,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "outbox relay started"
        );

        // Startup sweep picks up rows orphaned by a previous crash.
        self.sweep().await;

        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut sweep = tokio::time::interval_at(
            tokio::time::Instant::now() + self.config.sweep_interval,
            self.config.sweep_interval,
        );
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("outbox relay stopped");
                    break;
                }
                _ = sweep.tick() => {
                    self.sweep().await;
                }
                _ = poll.tick() => {
                    self.run_once(&shutdown).await;
                }
            }
        }
    }

    /// Claims and processes a single batch. Exposed for tests and manual
    /// drains; `run` calls this on every poll tick.
    pub async fn run_once(&self, shutdown: &CancellationToken) {
        let events = match self.store.claim_pending(self.config.batch_size).await {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "failed to claim pending events");
                return;
            }
        };

        if events.is_empty() {
            return;
        }

        debug!(count = events.len(), "processing outbox batch");
        self.metrics.lock().unwrap().batches_total += 1;

        for event in events {
            if shutdown.is_cancelled() {
                warn!(
                    "shutdown requested mid-batch, leaving remaining events for the recovery sweep"
                );
                break;
            }
            self.process_event(event).await;
        }
    }

    async fn process_event(&self, event: OutboxEvent) {
        let published = match tokio::time::timeout(
            self.config.publish_timeout,
            self.publisher.publish(&event),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PublishError::ConfirmTimeout(self.config.publish_timeout)),
        };

        match published {
            Ok(()) => {
                if let Err(e) = self.store.mark_processed(event.id).await {
                    // The event was delivered; the row stays PROCESSING and
                    // the sweep will re-claim it. Consumers deduplicate on
                    // the message id.
                    error!(
                        event_id = %event.id,
                        error = %e,
                        "publish succeeded but marking failed"
                    );
                    return;
                }
                debug!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "event processed"
                );
                self.metrics.lock().unwrap().published_total += 1;
            }
            Err(e) => {
                warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    retry_count = event.retry_count,
                    error = %e,
                    "publish failed"
                );
                self.metrics.lock().unwrap().failed_total += 1;
                self.handle_publish_failure(&event, &e).await;
            }
        }
    }

    async fn handle_publish_failure(&self, event: &OutboxEvent, cause: &PublishError) {
        if event.retry_count + 1 >= self.config.max_retries {
            match self.store.mark_failed(event.id, &cause.to_string()).await {
                Ok(()) => {
                    error!(
                        event_id = %event.id,
                        retries = event.retry_count + 1,
                        "retries exhausted, event marked FAILED"
                    );
                    self.metrics.lock().unwrap().dead_lettered_total += 1;
                }
                Err(e) => error!(event_id = %event.id, error = %e, "failed to mark event FAILED"),
            }
            return;
        }

        let delay = retry_backoff(
            self.config.retry_delay,
            self.config.max_retry_delay,
            event.retry_count,
        );
        match self
            .store
            .mark_for_retry(event.id, &cause.to_string(), delay)
            .await
        {
            Ok(()) => {
                self.metrics.lock().unwrap().retried_total += 1;
            }
            Err(e) => error!(event_id = %event.id, error = %e, "failed to schedule retry"),
        }
    }

    async fn sweep(&self) {
        match self.store.release_stuck(self.config.stuck_grace).await {
            Ok(0) => {}
            Ok(released) => {
                info!(released, "recovery sweep returned stuck events to PENDING");
                self.metrics.lock().unwrap().swept_total += released;
            }
            Err(e) => warn!(error = %e, "recovery sweep failed"),
        }
    }
}

fn retry_backoff(base: Duration, cap: Duration, retry_count: i32) -> Duration {
    let exponent = retry_count.clamp(0, 16) as u32;
    base.saturating_mul(2u32.saturating_pow(exponent)).min(cap)
}
