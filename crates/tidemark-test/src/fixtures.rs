//! Arrival-order fixtures
//!
//! Three event histories for one entity, each delivered in every order the
//! source systems were seen to produce:
//!
//! - Added (D1), Updated (D2), Removed (D3)
//! - Added (D1), Updated1 (D2), Updated2 (D3)
//! - Added1 (D1), Removed (D2), Added2 (D3)
//!
//! Offsets are chosen so that no arrival coincides with a retry, which keeps
//! every run deterministic under a paused clock.

use std::time::Duration;

use tidemark_core::{Event, EventKind, EventTime};
use tidemark_runtime::RetryPolicy;
use tidemark_state::PolicyKind;

use crate::{Scenario, ScenarioOutcome};

pub const ENTITY: &str = "1";

pub const D1: EventTime = EventTime::from_millis(1_000);
pub const D2: EventTime = EventTime::from_millis(2_000);
pub const D3: EventTime = EventTime::from_millis(3_000);

/// Expected end state of a fixture under one policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expectation {
    /// Payload name of the entity, `None` if it must be absent
    pub live: Option<&'static str>,
    /// Kinds of the dead-lettered events, creates first
    pub dead_lettered: Vec<EventKind>,
}

impl Expectation {
    pub fn empty() -> Self {
        Expectation {
            live: None,
            dead_lettered: Vec::new(),
        }
    }

    pub fn live(name: &'static str) -> Self {
        Expectation {
            live: Some(name),
            dead_lettered: Vec::new(),
        }
    }

    pub fn with_dead_letter(mut self, kind: EventKind) -> Self {
        self.dead_lettered.push(kind);
        self
    }
}

/// A scenario with its expected result per policy
#[derive(Clone, Debug)]
pub struct Fixture {
    pub scenario: Scenario,
    pub strict: Expectation,
    pub tolerant: Expectation,
}

impl Fixture {
    fn same(scenario: Scenario, expected: Expectation) -> Self {
        Fixture {
            scenario,
            strict: expected.clone(),
            tolerant: expected,
        }
    }

    pub fn expected(&self, policy: PolicyKind) -> &Expectation {
        match policy {
            PolicyKind::Strict => &self.strict,
            PolicyKind::TimeTolerant => &self.tolerant,
        }
    }

    /// Compare an outcome with the expectation for its policy
    pub fn check(&self, outcome: &ScenarioOutcome) -> Result<(), String> {
        let expected = self.expected(outcome.policy);
        let live = outcome.name_of(ENTITY);
        if live != expected.live {
            return Err(format!(
                "{} ({}): entity is {:?}, expected {:?}",
                outcome.name, outcome.policy, live, expected.live
            ));
        }
        let dead = outcome.dead_lettered_kinds();
        if dead != expected.dead_lettered {
            return Err(format!(
                "{} ({}): dead letters {:?}, expected {:?}",
                outcome.name, outcome.policy, dead, expected.dead_lettered
            ));
        }
        Ok(())
    }
}

fn added() -> Event {
    Event::created(ENTITY, "Added", D1)
}

fn updated() -> Event {
    Event::updated(ENTITY, "Updated", D2)
}

fn removed() -> Event {
    Event::deleted(ENTITY, D3)
}

/// Added, Updated and Removed in all six orders. Both policies agree.
pub fn added_updated_removed() -> Vec<Fixture> {
    let slow_retry = RetryPolicy::default().with_backoff(Duration::from_millis(300));

    vec![
        Fixture::same(
            Scenario::new("added-updated-removed")
                .at(0, added())
                .at(10, updated())
                .at(20, removed()),
            Expectation::empty(),
        ),
        Fixture::same(
            Scenario::new("added-removed-updated")
                .at(0, added())
                .at(10, removed())
                .at(20, updated()),
            Expectation::empty().with_dead_letter(EventKind::Updated),
        ),
        Fixture::same(
            Scenario::new("updated-added-removed")
                .at(0, updated())
                .at(100, added())
                .at(250, removed()),
            Expectation::empty(),
        ),
        Fixture::same(
            Scenario::new("updated-removed-added")
                .at(0, updated())
                .at_with(100, removed(), slow_retry)
                .at(150, added()),
            Expectation::empty(),
        ),
        Fixture::same(
            Scenario::new("removed-added-updated")
                .at(0, removed())
                .at(100, added())
                .at(110, updated()),
            Expectation::empty(),
        ),
        Fixture::same(
            Scenario::new("removed-updated-added")
                .at(0, removed())
                .at(100, updated())
                .at(190, added()),
            Expectation::empty().with_dead_letter(EventKind::Updated),
        ),
    ]
}

/// Added followed by two updates in both orders
pub fn added_updated_twice() -> Vec<Fixture> {
    let added = || Event::created(ENTITY, "Added", D1);
    let updated1 = || Event::updated(ENTITY, "Updated1", D2);
    let updated2 = || Event::updated(ENTITY, "Updated2", D3);

    vec![
        Fixture::same(
            Scenario::new("added-updated1-updated2")
                .at(0, added())
                .at(10, updated1())
                .at(20, updated2()),
            Expectation::live("Updated2"),
        ),
        // Strict overwrites with whichever update is applied last
        Fixture {
            scenario: Scenario::new("added-updated2-updated1")
                .at(0, added())
                .at(10, updated2())
                .at(20, updated1()),
            strict: Expectation::live("Updated1"),
            tolerant: Expectation::live("Updated2"),
        },
    ]
}

/// Added1, Removed and Added2 in all six orders. Added2 always survives;
/// strict dead-letters the old create whenever it arrives after Added2.
pub fn added_removed_added() -> Vec<Fixture> {
    let added1 = || Event::created(ENTITY, "Added1", D1);
    let removed = || Event::deleted(ENTITY, D2);
    let added2 = || Event::created(ENTITY, "Added2", D3);

    let old_create_loses = |scenario| Fixture {
        scenario,
        strict: Expectation::live("Added2").with_dead_letter(EventKind::Created),
        tolerant: Expectation::live("Added2"),
    };

    vec![
        Fixture::same(
            Scenario::new("added1-removed-added2")
                .at(0, added1())
                .at(10, removed())
                .at(20, added2()),
            Expectation::live("Added2"),
        ),
        Fixture::same(
            Scenario::new("added1-added2-removed")
                .at(0, added1())
                .at(10, added2())
                .at(110, removed()),
            Expectation::live("Added2"),
        ),
        Fixture::same(
            Scenario::new("removed-added1-added2")
                .at(0, removed())
                .at(100, added1())
                .at(110, added2()),
            Expectation::live("Added2"),
        ),
        old_create_loses(
            Scenario::new("added2-added1-removed")
                .at(0, added2())
                .at(10, added1())
                .at(110, removed()),
        ),
        old_create_loses(
            Scenario::new("removed-added2-added1")
                .at(0, removed())
                .at(100, added2())
                .at(110, added1()),
        ),
        old_create_loses(
            Scenario::new("added2-removed-added1")
                .at(0, added2())
                .at(10, removed())
                .at(110, added1()),
        ),
    ]
}

/// Every fixture
pub fn all_fixtures() -> Vec<Fixture> {
    let mut fixtures = added_updated_removed();
    fixtures.extend(added_updated_twice());
    fixtures.extend(added_removed_added());
    fixtures
}
