//! Round-robin load balancing strategy.

use std::time::Instant;

use crate::load_balancer::{pool::BackendPool, Selector};

/// Round-robin selector with skip-on-ineligible.
///
/// The rotation state lives in the pool's cursor, so the selector itself is
/// stateless and can be shared freely.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for RoundRobin {
    fn select(&self, pool: &BackendPool) -> Option<usize> {
        let len = pool.len();
        if len == 0 {
            return None;
        }

        let start = pool.current_index().wrapping_add(1);
        let now = Instant::now();

        for offset in 0..len {
            let index = (start + offset) % len;
            let eligible = pool
                .get(index)
                .is_some_and(|backend| backend.is_eligible_at(now));
            if eligible {
                pool.advance_to(index);
                return Some(index);
            }
        }

        tracing::debug!(backends = len, "No eligible backend after full scan");
        None
    }
}
