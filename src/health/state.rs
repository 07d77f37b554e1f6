//! Backend health state machine.
//!
//! # States
//! - Up: `alive = true`, failure count 0
//! - Down: `alive = false`, failure count counts consecutive failures
//!
//! # State Transitions
//! ```text
//! any → Down: failure observed (probe or forward), failure_count += 1
//! any → Up:   probe returned 200, failure_count = 0
//! ```
//!
//! # Design Decisions
//! - The triple (alive, failure_count, last_check) is one value, so it is
//!   always read and written as a unit under the backend's lock
//! - Every transition stamps `last_check`
//! - Eligibility layers the circuit breaker over `alive`

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::resilience::circuit_breaker::CooldownPolicy;

/// Consistent view of one backend's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub alive: bool,
    pub failure_count: u32,
    /// Monotonic stamp used for cooldown arithmetic.
    pub last_check: Instant,
    /// Wall-clock stamp reported on `/status`.
    pub last_check_at: DateTime<Utc>,
}

impl HealthSnapshot {
    /// Initial state: alive, no failures, stamped now.
    pub fn new() -> Self {
        Self {
            alive: true,
            failure_count: 0,
            last_check: Instant::now(),
            last_check_at: Utc::now(),
        }
    }

    /// Counts strictly upward until `u32::MAX`, where it stays. At one
    /// failure per second that ceiling is over a century away.
    pub(crate) fn record_failure(&mut self) {
        self.alive = false;
        self.failure_count = self.failure_count.saturating_add(1);
        self.touch();
    }

    pub(crate) fn record_success(&mut self) {
        self.alive = true;
        self.failure_count = 0;
        self.touch();
    }

    fn touch(&mut self) {
        self.last_check = Instant::now();
        self.last_check_at = Utc::now();
    }

    /// Whether the breaker currently holds this backend out.
    pub fn in_cooldown(&self, policy: &CooldownPolicy, now: Instant) -> bool {
        policy.is_open(self.failure_count, self.last_check, now)
    }

    /// Whether the selector may route to this backend at `now`.
    pub fn is_eligible(&self, policy: &CooldownPolicy, now: Instant) -> bool {
        !self.in_cooldown(policy, now) && self.alive
    }
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
