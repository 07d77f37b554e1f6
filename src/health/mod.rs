//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Warm-up delay, then periodic timer
//!     → Probe GET <backend>/health (skipped while the breaker is open)
//!     → Update backend state
//!
//! Passive health checks (passive.rs):
//!     Forwarding error observed
//!     → mark_failure immediately
//!
//! State (state.rs):
//!     (alive, failure_count, last_check) triple
//!     + circuit breaker cooldown → eligibility
//! ```
//!
//! # Design Decisions
//! - Active and passive checks are complementary and share one state triple
//! - Health state is per-backend, not per-pool
//! - The monitor runs as one background task and never blocks requests

pub mod active;
pub mod passive;
pub mod state;

pub use active::{HealthMonitor, ProbeOutcome, SweepReport};
pub use state::HealthSnapshot;
