//! Front door: the public router.
//!
//! # Responsibilities
//! - Route `/health` and `/status` to the operational handlers
//! - Send every other path through selection, forwarding and failover
//! - Wire up middleware (request ID, tracing, request timeout)
//!
//! # Design Decisions
//! - Proxying is the router fallback, so any path and method reaches it
//! - All-backends-down is a plain-text 503, never a 502

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::http::request::ForwardRequest;
use crate::http::response;
use crate::http::upstream::Upstreams;
use crate::load_balancer::{BackendPool, Selector};
use crate::observability::metrics;
use crate::resilience::forward_with_failover;
use crate::status::handlers::{get_health, get_status};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub selector: Arc<dyn Selector>,
    pub upstreams: Arc<Upstreams>,
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(
        pool: Arc<BackendPool>,
        selector: Arc<dyn Selector>,
        upstreams: Arc<Upstreams>,
        max_body_size: usize,
    ) -> Self {
        Self {
            pool,
            selector,
            upstreams,
            max_body_size,
        }
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", any(get_health))
        .route("/status", any(get_status))
        .fallback(proxy_handler)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Select a backend, forward, fail over once on error.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let forward = match ForwardRequest::from_request(request, client_ip, state.max_body_size).await
    {
        Ok(forward) => forward,
        Err(e) => {
            tracing::warn!(method = %method, path = %path, error = %e, "Rejected request");
            return e.into_response();
        }
    };

    match forward_with_failover(
        state.selector.as_ref(),
        &state.pool,
        &state.upstreams,
        &forward,
    )
    .await
    {
        Ok(forwarded) => {
            let status = forwarded.response.status();
            tracing::debug!(
                method = %method,
                path = %path,
                backend = %forwarded.backend,
                status = status.as_u16(),
                failed_over = forwarded.failed_over,
                "Proxied request"
            );
            metrics::record_request(&forwarded.backend.to_string(), status.as_u16(), start);
            response::from_upstream(forwarded.response)
        }
        Err(e) => {
            tracing::warn!(method = %method, path = %path, error = %e, "Service unavailable");
            metrics::record_request("none", 503, start);
            response::service_unavailable()
        }
    }
}
