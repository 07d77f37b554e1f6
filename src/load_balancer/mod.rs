//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → round_robin.rs (scan from cursor + 1, skip ineligible backends)
//!     → pool.rs (advance shared cursor to the chosen index)
//!     → backend.rs (eligibility = alive flag + circuit breaker)
//!     → Return backend index or "no backend available"
//! ```
//!
//! # Design Decisions
//! - Selection never takes a pool-wide lock: each backend has its own
//!   lock and the cursor is a single atomic
//! - A scan visits each backend at most once and never blocks
//! - The pool is built once at startup and never resized

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::Backend;
pub use pool::{BackendPool, EmptyPool};
pub use round_robin::RoundRobin;

/// Strategy that picks the next backend to receive a request.
pub trait Selector: Send + Sync + std::fmt::Debug {
    /// Index of the chosen backend, or `None` when nothing is eligible.
    fn select(&self, pool: &BackendPool) -> Option<usize>;
}
