//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into the pool, selector and adapters
//! - Build the health monitor over the same pool
//! - Resolve the listen address and TLS material
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing is spawned here; the caller decides when traffic starts

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::{backend_urls, BalancerConfig, ValidationError};
use crate::health::HealthMonitor;
use crate::http::server::AppState;
use crate::http::upstream::{build_client, Upstreams};
use crate::load_balancer::{BackendPool, EmptyPool, RoundRobin};
use crate::net::{load_tls_config, TlsError};
use crate::resilience::CooldownPolicy;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Pool(#[from] EmptyPool),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid listen host {0:?}")]
    Address(String),

    #[error(transparent)]
    Tls(#[from] TlsError),
}

/// Everything the server and the monitor share.
pub struct Components {
    pub state: AppState,
    pub monitor: HealthMonitor,
}

pub fn build(config: &BalancerConfig) -> Result<Components, StartupError> {
    let urls = backend_urls(config)?;
    let policy = CooldownPolicy::from(&config.circuit_breaker);
    let pool = Arc::new(BackendPool::new(urls, policy)?);

    for (index, backend) in pool.all_backends().iter().enumerate() {
        tracing::info!(index, backend = %backend, "Configured backend");
    }

    let client = build_client(&config.timeouts)?;
    let upstreams = Arc::new(Upstreams::new(
        &pool,
        client,
        config.timeouts.response_header(),
    ));

    let monitor = HealthMonitor::new(
        pool.clone(),
        config.health_check.clone(),
        config.observability.debug,
    )?;

    let state = AppState::new(
        pool,
        Arc::new(RoundRobin),
        upstreams,
        config.security.max_body_size,
    );

    Ok(Components { state, monitor })
}

pub fn listen_addr(config: &BalancerConfig) -> Result<SocketAddr, StartupError> {
    let host = config.listener.host.trim();
    let ip: IpAddr = host
        .parse()
        .map_err(|_| StartupError::Address(host.to_string()))?;
    Ok(SocketAddr::new(ip, config.listener.port))
}

pub async fn tls(config: &BalancerConfig) -> Result<RustlsConfig, StartupError> {
    let tls = &config.listener.tls;
    let cert = tls.cert_path.as_deref().ok_or(ValidationError::MissingTlsCert)?;
    let key = tls.key_path.as_deref().ok_or(ValidationError::MissingTlsKey)?;
    Ok(load_tls_config(Path::new(cert), Path::new(key)).await?)
}
