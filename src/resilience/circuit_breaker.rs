//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: failure count at or below the threshold; eligibility follows `alive`
//! - Open: failure count above the threshold and the last state change is
//!   younger than the cooldown; the backend is excluded and not probed
//! - Expired: cooldown elapsed; eligibility falls back to `alive`, which stays
//!   false until a probe marks the backend up
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count > failure_threshold
//! Open → Expired: now - last_check >= cooldown
//! Open/Expired → Closed: mark_success resets failure_count to 0
//! ```
//!
//! # Design Decisions
//! - Per-backend breaker, evaluated from the backend's own health triple
//! - There is no half-open probe: recovery is left to the health monitor

use std::time::{Duration, Instant};

use crate::config::CircuitBreakerConfig;

/// Threshold and window of the per-backend breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub failure_threshold: u32,
    pub cooldown: Duration,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::from(&CircuitBreakerConfig::default())
    }
}

impl From<&CircuitBreakerConfig> for CooldownPolicy {
    fn from(config: &CircuitBreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold,
            cooldown: config.cooldown(),
        }
    }
}

impl CooldownPolicy {
    /// True while the breaker holds the backend out of rotation.
    pub fn is_open(&self, failure_count: u32, last_check: Instant, now: Instant) -> bool {
        failure_count > self.failure_threshold
            && now.saturating_duration_since(last_check) < self.cooldown
    }
}
