//! Passive health checking (failure detection on the request path).
//!
//! # Responsibilities
//! - Observe forwarding outcomes
//! - Mark the backend down immediately, without waiting for the next probe
//!
//! # Design Decisions
//! - Only transport failures count (refused, reset, timeout, TLS)
//! - Any HTTP response from the backend, 5xx included, is passed through
//!   untouched and is not a failure

use crate::http::upstream::ForwardError;
use crate::load_balancer::Backend;
use crate::observability::metrics;

/// Record a failed forward against `backend`.
pub fn record_forward_failure(backend: &Backend, error: &ForwardError) {
    let state = backend.mark_failure();
    tracing::warn!(
        backend = %backend,
        error = %error,
        failures = state.failure_count,
        "Error proxying to backend"
    );
    metrics::record_backend_health(&backend.to_string(), false);
}
