//! Dispatcher - routes each event to its kind's handler and dead-letter sink

use std::sync::Arc;

use parking_lot::Mutex;
use tidemark_core::{ApplyOutcome, Event};
use tidemark_state::{ReconciliationStore, Snapshot};

use crate::{
    deliver, CreateHandler, DeadLetterQueues, DeleteHandler, DeliveryReport, RetryPolicy,
    RuntimeConfig, UpdateHandler,
};

/// Delivery counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Deliveries that reached a terminal state
    pub delivered: u64,
    pub applied: u64,
    pub stale: u64,
    /// Attempts after the first, across all deliveries
    pub retries: u64,
    pub dead_lettered: u64,
}

impl DeliveryStats {
    fn record(&mut self, report: &DeliveryReport) {
        self.delivered += 1;
        self.retries += u64::from(report.retries());
        match report.outcome() {
            Some(ApplyOutcome::Applied) => self.applied += 1,
            Some(ApplyOutcome::Stale) => self.stale += 1,
            None => self.dead_lettered += 1,
        }
    }
}

/// Event dispatcher
///
/// Owns one store shared by the three handlers. Deliveries for the same id
/// are not sequenced here; concurrent and duplicate events are resolved by
/// the store's policy.
pub struct Dispatcher {
    store: Arc<dyn ReconciliationStore>,
    created: CreateHandler,
    updated: UpdateHandler,
    deleted: DeleteHandler,
    dead_letters: DeadLetterQueues,
    config: RuntimeConfig,
    stats: Mutex<DeliveryStats>,
}

impl Dispatcher {
    /// Build a dispatcher with a fresh store for the configured policy
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_store(config.policy.build(), config)
    }

    /// Build a dispatcher around an existing store
    ///
    /// The store's own policy wins over `config.policy`.
    pub fn with_store(store: Arc<dyn ReconciliationStore>, config: RuntimeConfig) -> Self {
        let config = config.with_policy(store.policy());
        Dispatcher {
            created: CreateHandler::new(store.clone()),
            updated: UpdateHandler::new(store.clone()),
            deleted: DeleteHandler::new(store.clone()),
            store,
            dead_letters: DeadLetterQueues::new(),
            config,
            stats: Mutex::new(DeliveryStats::default()),
        }
    }

    /// Deliver one event with the configured retry policy
    pub async fn dispatch(&self, event: Event) -> DeliveryReport {
        let policy = self.config.retry;
        self.dispatch_with(event, &policy).await
    }

    /// Deliver one event with an explicit retry policy
    pub async fn dispatch_with(&self, event: Event, policy: &RetryPolicy) -> DeliveryReport {
        let report = match event {
            Event::Created(e) => {
                deliver(&self.created, e, &self.dead_letters.created, policy).await
            }
            Event::Updated(e) => {
                deliver(&self.updated, e, &self.dead_letters.updated, policy).await
            }
            Event::Deleted(e) => {
                deliver(&self.deleted, e, &self.dead_letters.deleted, policy).await
            }
        };

        self.stats.lock().record(&report);
        report
    }

    /// Drain every dead-letter sink and deliver the events again
    ///
    /// Creates go first, then updates, then deletes. Events that fail again
    /// end up back in their sink.
    pub async fn replay_dead_letters(&self) -> Vec<DeliveryReport> {
        let mut events: Vec<Event> = Vec::with_capacity(self.dead_letters.total());
        events.extend(self.dead_letters.created.drain().into_iter().map(Event::from));
        events.extend(self.dead_letters.updated.drain().into_iter().map(Event::from));
        events.extend(self.dead_letters.deleted.drain().into_iter().map(Event::from));

        tracing::info!(count = events.len(), "replaying dead-lettered events");

        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            reports.push(self.dispatch(event).await);
        }
        reports
    }

    pub fn store(&self) -> &Arc<dyn ReconciliationStore> {
        &self.store
    }

    /// Copy of the live entities
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn dead_letters(&self) -> &DeadLetterQueues {
        &self.dead_letters
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats.lock().clone()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
