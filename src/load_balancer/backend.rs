//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its immutable base URL
//! - Guard the health triple behind a per-backend reader/writer lock
//! - Answer eligibility with the circuit breaker applied

use std::time::Instant;

use parking_lot::RwLock;
use url::Url;

use crate::health::state::HealthSnapshot;
use crate::resilience::circuit_breaker::CooldownPolicy;

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Base URL as configured.
    url: Url,
    /// `scheme://host[:port]`, pre-rendered for request rewriting.
    origin: String,
    policy: CooldownPolicy,
    state: RwLock<HealthSnapshot>,
}

impl Backend {
    /// Create a new backend, initially alive.
    pub fn new(url: Url, policy: CooldownPolicy) -> Self {
        let origin = url.origin().ascii_serialization();
        Self {
            url,
            origin,
            policy,
            state: RwLock::new(HealthSnapshot::new()),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn policy(&self) -> &CooldownPolicy {
        &self.policy
    }

    /// Copy of the health triple, taken under one read lock.
    pub fn snapshot(&self) -> HealthSnapshot {
        *self.state.read()
    }

    /// Record a failed probe or forward. Returns the new state.
    pub fn mark_failure(&self) -> HealthSnapshot {
        let mut state = self.state.write();
        state.record_failure();
        *state
    }

    /// Record a successful probe. Returns the state it replaced.
    pub fn mark_success(&self) -> HealthSnapshot {
        let mut state = self.state.write();
        let previous = *state;
        state.record_success();
        previous
    }

    pub fn is_eligible(&self) -> bool {
        self.is_eligible_at(Instant::now())
    }

    pub fn is_eligible_at(&self, now: Instant) -> bool {
        self.snapshot().is_eligible(&self.policy, now)
    }

    pub fn in_cooldown(&self) -> bool {
        self.snapshot().in_cooldown(&self.policy, Instant::now())
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str().trim_end_matches('/'))
    }
}
