//! mesh-balancer
//!
//! ```text
//!     Client (HTTPS)
//!         │
//!         ▼
//!   ┌──────────────┐   /health, /status   ┌──────────────┐
//!   │  front door  │─────────────────────▶│    status    │
//!   │ (axum + TLS) │                      └──────────────┘
//!   └──────┬───────┘
//!          │ any other path
//!          ▼
//!   ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!   │   selector   │───▶│   adapter    │───▶│   backend    │
//!   │ (round robin)│    │ (+ failover) │    │  (HTTP/S)    │
//!   └──────┬───────┘    └──────┬───────┘    └──────▲───────┘
//!          │                   │ mark down          │
//!          ▼                   ▼                    │ probe
//!   ┌─────────────────────────────┐    ┌────────────┴─┐
//!   │   backend pool + cursor     │◀───│health monitor│
//!   └─────────────────────────────┘    └──────────────┘
//! ```

use mesh_balancer::config;
use mesh_balancer::lifecycle;
use mesh_balancer::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(logging::debug_from_env());

    tracing::info!("mesh-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        port = config.listener.port,
        backends = config.backends.len(),
        debug = config.observability.debug,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        metrics::init_metrics(addr.trim().parse()?)?;
    }

    if let Err(e) = lifecycle::run(config).await {
        tracing::error!(error = %e, "Load balancer stopped with error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
