//! Upstream forwarding: one pre-wired adapter per backend.
//!
//! # Responsibilities
//! - Build the shared upstream client (timeouts, idle pool bounds)
//! - Re-target a prepared request at one backend's scheme and authority
//! - Bound the wait for response headers and every body read after it
//!
//! # Design Decisions
//! - Adapters share one connection pool; reqwest keys idle connections
//!   per host, so each backend still gets its own bounded idle set
//! - Certificate verification is off: backends present mesh-internal certs
//! - Redirects are returned to the client, never followed

use std::sync::Arc;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::http::request::ForwardRequest;
use crate::load_balancer::{Backend, BackendPool};

/// A forward that produced no upstream response.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("no response headers within {0:?}")]
    HeaderTimeout(Duration),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Build the client used for all forwarded traffic.
pub fn build_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .connect_timeout(timeouts.connect())
        .read_timeout(timeouts.upstream_read())
        .pool_idle_timeout(timeouts.idle_pool())
        .pool_max_idle_per_host(timeouts.max_idle_per_host)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
}

/// Forwarding engine bound to a single backend.
#[derive(Debug, Clone)]
pub struct ProxyAdapter {
    backend: Arc<Backend>,
    client: reqwest::Client,
    header_timeout: Duration,
}

impl ProxyAdapter {
    pub fn new(backend: Arc<Backend>, client: reqwest::Client, header_timeout: Duration) -> Self {
        Self {
            backend,
            client,
            header_timeout,
        }
    }

    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    /// The request's path and query on this backend.
    pub fn target_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.backend.origin(), path_and_query)
    }

    /// Send `request` to this backend; resolves once response headers arrive.
    pub async fn forward(&self, request: &ForwardRequest) -> Result<reqwest::Response, ForwardError> {
        let send = self
            .client
            .request(request.method.clone(), self.target_url(&request.path_and_query))
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send();

        match tokio::time::timeout(self.header_timeout, send).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ForwardError::HeaderTimeout(self.header_timeout)),
        }
    }
}

/// Adapters indexed like the pool they were built from.
#[derive(Debug, Clone)]
pub struct Upstreams {
    adapters: Vec<ProxyAdapter>,
}

impl Upstreams {
    /// Wire one adapter per pool entry, in pool order.
    pub fn new(pool: &BackendPool, client: reqwest::Client, header_timeout: Duration) -> Self {
        let adapters = pool
            .all_backends()
            .iter()
            .map(|backend| ProxyAdapter::new(backend.clone(), client.clone(), header_timeout))
            .collect();
        Self { adapters }
    }

    pub fn get(&self, index: usize) -> Option<&ProxyAdapter> {
        self.adapters.get(index)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
