//! Scenario runner
//!
//! A scenario is a list of events, each scheduled at an offset from the
//! start. Every step runs as its own tokio task against one shared
//! dispatcher, so retries of early events interleave with later arrivals.
//! Under a paused clock the interleaving is fully determined by the offsets
//! and back-off intervals.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tidemark_core::{EntityId, Event, EventKind, EventTime};
use tidemark_runtime::{DeliveryReport, DeliveryStats, Dispatcher, RetryPolicy, RuntimeConfig};
use tidemark_state::{PolicyKind, Snapshot};
use tokio::task::JoinError;

/// Scenario errors
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Step {step} of scenario '{scenario}' did not complete: {source}")]
    StepFailed {
        scenario: String,
        step: usize,
        #[source]
        source: JoinError,
    },
}

/// One scheduled delivery
#[derive(Clone, Debug)]
pub struct Step {
    /// Offset from scenario start
    pub at: Duration,
    pub event: Event,
    /// Retry policy for this delivery only
    pub retry: Option<RetryPolicy>,
}

/// Scheduled event deliveries
#[derive(Clone, Debug)]
pub struct Scenario {
    name: String,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Scenario {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Deliver `event` at `at_ms` milliseconds
    pub fn at(mut self, at_ms: u64, event: Event) -> Self {
        self.steps.push(Step {
            at: Duration::from_millis(at_ms),
            event,
            retry: None,
        });
        self
    }

    /// Deliver `event` at `at_ms` milliseconds with its own retry policy
    pub fn at_with(mut self, at_ms: u64, event: Event, retry: RetryPolicy) -> Self {
        self.steps.push(Step {
            at: Duration::from_millis(at_ms),
            event,
            retry: Some(retry),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run on a fresh store of the given policy with default retries
    pub async fn run(&self, policy: PolicyKind) -> Result<ScenarioOutcome, ScenarioError> {
        self.run_with(RuntimeConfig::default().with_policy(policy))
            .await
    }

    /// Run on a fresh dispatcher built from `config`
    pub async fn run_with(&self, config: RuntimeConfig) -> Result<ScenarioOutcome, ScenarioError> {
        let dispatcher = Arc::new(Dispatcher::new(config));
        let started = tokio::time::Instant::now();

        tracing::debug!(
            scenario = %self.name,
            policy = %config.policy,
            steps = self.steps.len(),
            "running scenario"
        );

        let tasks: Vec<_> = self
            .steps
            .iter()
            .cloned()
            .map(|step| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    if !step.at.is_zero() {
                        tokio::time::sleep(step.at).await;
                    }
                    match step.retry {
                        Some(retry) => dispatcher.dispatch_with(step.event, &retry).await,
                        None => dispatcher.dispatch(step.event).await,
                    }
                })
            })
            .collect();

        let mut reports = Vec::with_capacity(tasks.len());
        for (step, task) in tasks.into_iter().enumerate() {
            let report = task.await.map_err(|source| ScenarioError::StepFailed {
                scenario: self.name.clone(),
                step,
                source,
            })?;
            reports.push(report);
        }

        let queues = dispatcher.dead_letters();
        let mut dead_letters: Vec<Event> = Vec::with_capacity(queues.total());
        dead_letters.extend(queues.created.events().into_iter().map(Event::from));
        dead_letters.extend(queues.updated.events().into_iter().map(Event::from));
        dead_letters.extend(queues.deleted.events().into_iter().map(Event::from));

        Ok(ScenarioOutcome {
            name: self.name.clone(),
            policy: config.policy,
            snapshot: dispatcher.snapshot(),
            reports,
            dead_letters,
            stats: dispatcher.stats(),
            elapsed: started.elapsed(),
        })
    }
}

/// Result of a scenario run
#[derive(Clone, Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    pub policy: PolicyKind,
    /// Store contents after every delivery finished
    pub snapshot: Snapshot,
    /// Delivery reports in step order
    pub reports: Vec<DeliveryReport>,
    /// Dead-lettered events, creates first, then updates, then deletes
    pub dead_letters: Vec<Event>,
    pub stats: DeliveryStats,
    /// Clock time until the last delivery finished
    pub elapsed: Duration,
}

impl ScenarioOutcome {
    /// Payload name of a live entity
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.snapshot
            .get(&EntityId::from(id))
            .map(|record| record.payload.name.as_str())
    }

    pub fn watermark_of(&self, id: &str) -> Option<EventTime> {
        self.snapshot
            .get(&EntityId::from(id))
            .map(|record| record.last_event_time)
    }

    pub fn dead_lettered_kinds(&self) -> Vec<EventKind> {
        self.dead_letters.iter().map(Event::kind).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.dead_letters.is_empty()
    }
}
