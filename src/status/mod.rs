//! Operational endpoints.
//!
//! - `GET /health`: liveness of the balancer as a whole, in plain text
//! - `GET /status`: JSON snapshot of every backend and the cursor
//!
//! Both answer 503 when no backend is eligible, so an outer load balancer
//! or orchestrator can take this instance out of rotation.

pub mod handlers;

pub use handlers::{build_report, BackendStatus, StatusReport};
