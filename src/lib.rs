//! TLS-terminating round-robin load balancer.
//!
//! Requests arriving on the TLS listener are forwarded to one of a fixed
//! set of HTTP backends, chosen round-robin among those currently eligible.
//! A background monitor probes every backend; a failed forward marks its
//! backend down at once and the request is retried on the next one.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod status;

pub use config::BalancerConfig;
pub use http::{build_router, AppState};
pub use lifecycle::Shutdown;
