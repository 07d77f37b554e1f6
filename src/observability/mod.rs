//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer, filter from RUST_LOG or DEBUG)
//!     → Metrics endpoint (Prometheus scrape, only when METRICS_ADDR is set)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`backend = %url`) rather than formatted strings
//! - Request ID (`x-request-id`) flows from the front door to the backend
//! - Metric updates are cheap no-ops when no exporter is installed

pub mod logging;
pub mod metrics;
