//! Backend pool management.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of backends
//! - Hold the shared rotation cursor
//! - Answer aggregate questions (eligible count)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::load_balancer::backend::Backend;
use crate::resilience::circuit_breaker::CooldownPolicy;

/// Error returned when a pool would be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a backend pool needs at least one backend")]
pub struct EmptyPool;

/// Ordered backends plus the round-robin cursor.
///
/// The length never changes after construction and the cursor is always a
/// valid index.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    /// Index of the last backend handed out.
    cursor: AtomicUsize,
}

impl BackendPool {
    /// Build a pool with one alive backend per URL, in order.
    pub fn new(urls: Vec<Url>, policy: CooldownPolicy) -> Result<Self, EmptyPool> {
        let backends = urls
            .into_iter()
            .map(|url| Arc::new(Backend::new(url, policy)))
            .collect();
        Self::from_backends(backends)
    }

    pub fn from_backends(backends: Vec<Arc<Backend>>) -> Result<Self, EmptyPool> {
        if backends.is_empty() {
            return Err(EmptyPool);
        }
        Ok(Self {
            backends,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    /// Return a list of all backends (for health checking and status).
    pub fn all_backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn current_index(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Record `index` as the last selected backend.
    pub fn advance_to(&self, index: usize) {
        debug_assert!(index < self.backends.len());
        self.cursor.store(index % self.backends.len(), Ordering::Release);
    }

    /// Number of backends the selector may currently route to.
    pub fn eligible_count(&self) -> usize {
        let now = Instant::now();
        self.backends.iter().filter(|b| b.is_eligible_at(now)).count()
    }
}
