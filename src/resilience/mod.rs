//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → retries.rs (select, forward, on error mark down + one retry)
//!     → circuit_breaker.rs (failure_count > threshold excludes the backend
//!       for the cooldown window)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - One reactive retry, against a different backend, with no backoff
//! - The breaker is evaluated from backend state, never stored separately

pub mod circuit_breaker;
pub mod retries;

pub use circuit_breaker::CooldownPolicy;
pub use retries::{forward_with_failover, FailoverError, Forwarded};
