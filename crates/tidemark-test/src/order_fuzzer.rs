//! Delivery-order fuzzer
//!
//! Generates a per-entity history (one Create, a run of Updates and an
//! optional Delete, strictly increasing in event time), then applies it to a
//! store with the Create first and everything else shuffled. The
//! time-tolerant store must end in the state of the latest-timestamped event
//! regardless of the shuffle.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tidemark_core::{ApplyOutcome, EntityId, Event, EventTime, ReconcileResult};
use tidemark_state::{PolicyKind, ReconciliationStore, Snapshot};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Entities per round
    pub entity_count: usize,
    /// Upper bound on updates per entity
    pub max_updates: usize,
    /// Probability that an entity's history ends in a Delete (0.0 - 1.0)
    pub delete_prob: f64,
    /// Independent shuffles to run
    pub rounds: usize,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            entity_count: 10,
            max_updates: 8,
            delete_prob: 0.3,
            rounds: 100,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            entity_count: 3,
            max_updates: 4,
            delete_prob: 0.3,
            rounds: 20,
            seed: 42,
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            entity_count: 50,
            max_updates: 32,
            delete_prob: 0.5,
            rounds: 1000,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Expected end state of one entity
#[derive(Clone, Debug, PartialEq, Eq)]
enum Expected {
    Live { name: String, time: EventTime },
    Gone,
}

/// Generated history for one entity, in event-time order
#[derive(Clone, Debug)]
pub struct History {
    pub id: EntityId,
    pub events: Vec<Event>,
}

impl History {
    fn expected(&self) -> Expected {
        match self.events.last() {
            Some(Event::Deleted(_)) | None => Expected::Gone,
            Some(last) => Expected::Live {
                name: last
                    .payload()
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                time: last.time(),
            },
        }
    }
}

/// Order fuzzer
pub struct OrderFuzzer {
    config: FuzzerConfig,
    rng: StdRng,
}

impl OrderFuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        OrderFuzzer { config, rng }
    }

    /// Generate a history whose times strictly increase from a random base
    pub fn generate_history(&mut self, id: EntityId) -> History {
        let mut time = EventTime::from_millis(self.rng.gen_range(0..1_000_000));
        let mut next_time = |rng: &mut StdRng| {
            time = EventTime::from_micros(time.as_micros() + rng.gen_range(1..10_000));
            time
        };

        let mut events = Vec::new();
        let t = next_time(&mut self.rng);
        events.push(Event::created(id.clone(), "created", t));

        let updates = self.rng.gen_range(0..=self.config.max_updates);
        for n in 0..updates {
            let t = next_time(&mut self.rng);
            events.push(Event::updated(id.clone(), format!("update-{}", n), t));
        }

        if self.rng.gen_bool(self.config.delete_prob) {
            let t = next_time(&mut self.rng);
            events.push(Event::deleted(id.clone(), t));
        }

        History { id, events }
    }

    /// Create first, then the rest of every history shuffled together
    fn arrival_order(&mut self, histories: &[History]) -> Vec<Event> {
        let mut creates = Vec::with_capacity(histories.len());
        let mut rest = Vec::new();
        for history in histories {
            let mut events = history.events.iter().cloned();
            creates.extend(events.next());
            rest.extend(events);
        }
        creates.shuffle(&mut self.rng);
        rest.shuffle(&mut self.rng);
        creates.extend(rest);
        creates
    }

    /// Run every round against fresh stores of `policy`
    pub fn run(&mut self, policy: PolicyKind) -> FuzzResult {
        let mut result = FuzzResult::new(policy);

        for round in 0..self.config.rounds {
            let histories: Vec<History> = (0..self.config.entity_count)
                .map(|n| self.generate_history(EntityId::new(format!("e{}", n))))
                .collect();
            let arrivals = self.arrival_order(&histories);

            let store = policy.build();
            for event in &arrivals {
                result.record(apply(store.as_ref(), event));
            }

            let snapshot = store.snapshot();
            for history in &histories {
                if let Some(violation) = compare(&snapshot, &history.id, &history.expected()) {
                    result
                        .violations
                        .push(format!("round {}: {}", round, violation));
                }
            }
            result.rounds += 1;
        }

        tracing::debug!(
            policy = %policy,
            rounds = result.rounds,
            applied = result.applied,
            stale = result.stale,
            rejected = result.rejected,
            violations = result.violations.len(),
            "order fuzzing finished"
        );

        result
    }
}

fn apply(store: &dyn ReconciliationStore, event: &Event) -> ReconcileResult<ApplyOutcome> {
    match event {
        Event::Created(e) => store.create(&e.id, &e.payload, e.time),
        Event::Updated(e) => store.update(&e.id, &e.payload, e.time),
        Event::Deleted(e) => store.delete(&e.id, e.time),
    }
}

fn compare(snapshot: &Snapshot, id: &EntityId, expected: &Expected) -> Option<String> {
    let actual = snapshot
        .get(id)
        .map(|record| (record.payload.name.as_str(), record.last_event_time));

    match (expected, actual) {
        (Expected::Gone, None) => None,
        (Expected::Live { name, time }, Some((actual_name, actual_time)))
            if name == actual_name && *time == actual_time =>
        {
            None
        }
        (expected, actual) => Some(format!(
            "{}: expected {:?}, found {:?}",
            id, expected, actual
        )),
    }
}

/// Fuzzing result
#[derive(Clone, Debug)]
pub struct FuzzResult {
    pub policy: PolicyKind,
    pub rounds: usize,
    pub applied: u64,
    pub stale: u64,
    /// Store calls that returned an error (a delivery would retry these)
    pub rejected: u64,
    pub violations: Vec<String>,
}

impl FuzzResult {
    pub fn new(policy: PolicyKind) -> Self {
        FuzzResult {
            policy,
            rounds: 0,
            applied: 0,
            stale: 0,
            rejected: 0,
            violations: Vec::new(),
        }
    }

    fn record(&mut self, result: ReconcileResult<ApplyOutcome>) {
        match result {
            Ok(ApplyOutcome::Applied) => self.applied += 1,
            Ok(ApplyOutcome::Stale) => self.stale += 1,
            Err(_) => self.rejected += 1,
        }
    }

    /// Did every round converge?
    pub fn is_converged(&self) -> bool {
        self.violations.is_empty()
    }
}
