//! Runtime configuration

use std::time::Duration;

use thiserror::Error;
use tidemark_state::{ParsePolicyError, PolicyKind};

use crate::RetryPolicy;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Policy(#[from] ParsePolicyError),

    #[error("Failed to install tracing subscriber: {0}")]
    Telemetry(String),
}

/// Runtime configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Reconciliation policy of the store built by the dispatcher
    pub policy: PolicyKind,
    /// Retry policy applied to every delivery unless overridden
    pub retry: RetryPolicy,
}

impl RuntimeConfig {
    /// Strict store, default retries
    pub fn strict() -> Self {
        RuntimeConfig {
            policy: PolicyKind::Strict,
            retry: RetryPolicy::default(),
        }
    }

    /// Time-tolerant store, default retries
    pub fn tolerant() -> Self {
        RuntimeConfig {
            policy: PolicyKind::TimeTolerant,
            retry: RetryPolicy::default(),
        }
    }

    /// Parse the policy by name, keeping default retries
    pub fn for_policy_name(name: &str) -> Result<Self, ConfigError> {
        Ok(RuntimeConfig {
            policy: name.parse()?,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.retry.backoff = backoff;
        self
    }
}
