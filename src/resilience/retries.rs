//! Reactive failover.
//!
//! # Responsibilities
//! - Select a backend and forward the request to it
//! - On a forwarding error, mark that backend down at once and retry
//!   against the next eligible backend, exactly once
//!
//! # Design Decisions
//! - Single hop: a failed retry is not retried again
//! - No backoff; the second attempt goes out immediately
//! - The retry target must differ from the failed backend
//! - HTTP error statuses are responses, not forwarding errors

use std::sync::Arc;

use crate::health::passive::record_forward_failure;
use crate::http::request::ForwardRequest;
use crate::http::upstream::{ProxyAdapter, Upstreams};
use crate::load_balancer::{Backend, BackendPool, Selector};
use crate::observability::metrics;

/// Why a request could not be served by any backend.
#[derive(Debug, thiserror::Error)]
pub enum FailoverError {
    #[error("no backend available")]
    NoBackendAvailable,

    #[error("backend {failed} failed and no alternative backend could serve")]
    Exhausted { failed: String },
}

/// A response obtained from some backend.
#[derive(Debug)]
pub struct Forwarded {
    pub response: reqwest::Response,
    pub backend: Arc<Backend>,
    /// True when the first choice failed and this came from the retry.
    pub failed_over: bool,
}

/// Fixed dispatch path from selection to response.
pub async fn forward_with_failover(
    selector: &dyn Selector,
    pool: &BackendPool,
    upstreams: &Upstreams,
    request: &ForwardRequest,
) -> Result<Forwarded, FailoverError> {
    let first_index = selector
        .select(pool)
        .ok_or(FailoverError::NoBackendAvailable)?;
    let first = adapter(upstreams, first_index)?;

    tracing::debug!(backend = %first.backend(), "Routing request");
    let error = match first.forward(request).await {
        Ok(response) => {
            return Ok(Forwarded {
                response,
                backend: first.backend().clone(),
                failed_over: false,
            })
        }
        Err(e) => e,
    };
    record_forward_failure(first.backend(), &error);

    let exhausted = || FailoverError::Exhausted {
        failed: first.backend().to_string(),
    };

    let retry_index = match selector.select(pool) {
        Some(index) if index != first_index => index,
        _ => {
            tracing::warn!(failed = %first.backend(), "No healthy backends available for retry");
            return Err(exhausted());
        }
    };
    let retry = adapter(upstreams, retry_index)?;

    metrics::record_failover();
    tracing::info!(
        failed = %first.backend(),
        backend = %retry.backend(),
        "Retrying request with another backend"
    );

    match retry.forward(request).await {
        Ok(response) => Ok(Forwarded {
            response,
            backend: retry.backend().clone(),
            failed_over: true,
        }),
        Err(e) => {
            record_forward_failure(retry.backend(), &e);
            Err(exhausted())
        }
    }
}

fn adapter(upstreams: &Upstreams, index: usize) -> Result<&ProxyAdapter, FailoverError> {
    upstreams.get(index).ok_or(FailoverError::NoBackendAvailable)
}
