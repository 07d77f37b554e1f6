//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → pool + adapters + monitor → TLS → spawn monitor → serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → stop monitor → stop accepting → drain in-flight → exit
//! ```
//!
//! # Design Decisions
//! - Draining is bounded by `timeouts.shutdown_grace_secs`
//! - Clients get `timeouts.header_read_secs` to send request headers
//! - Exceeding the bound is an error so the process exits non-zero
//! - The monitor is cancelled and joined, never left detached

pub mod shutdown;
pub mod signals;
pub mod startup;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum_server::Handle;
use hyper_util::rt::TokioTimer;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::BalancerConfig;
use crate::http::build_router;

pub use shutdown::Shutdown;
pub use startup::StartupError;

/// How long the monitor gets to notice the stop notice before it is aborted.
const MONITOR_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("server error: {0}")]
    Server(#[source] io::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),

    #[error("in-flight requests did not drain within {0:?}")]
    ShutdownTimedOut(Duration),
}

/// Serve until a termination signal, then shut down gracefully.
pub async fn run(config: BalancerConfig) -> Result<(), LifecycleError> {
    serve(config, Handle::new(), signals::wait_for_termination()).await
}

/// Serve until `termination` resolves. `handle` reports the bound address.
pub async fn serve<S>(
    config: BalancerConfig,
    handle: Handle,
    termination: S,
) -> Result<(), LifecycleError>
where
    S: Future<Output = io::Result<&'static str>>,
{
    let components = startup::build(&config)?;
    let addr = startup::listen_addr(&config)?;
    let tls = startup::tls(&config).await?;

    let shutdown = Shutdown::new();
    let monitor = tokio::spawn(components.monitor.run(shutdown.subscribe()));

    let backends = components.state.pool.len();
    let router = build_router(components.state, config.timeouts.request());

    let mut server = axum_server::bind_rustls(addr, tls).handle(handle.clone());
    server
        .http_builder()
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(config.timeouts.header_read());
    server
        .http_builder()
        .http2()
        .timer(TokioTimer::new())
        .keep_alive_interval(config.timeouts.header_read())
        .keep_alive_timeout(config.timeouts.header_read());
    let server = server.serve(router.into_make_service_with_connect_info::<SocketAddr>());
    tokio::pin!(server);

    tracing::info!(address = %addr, backends, "Load balancer listening (TLS)");

    tokio::select! {
        result = &mut server => {
            shutdown.trigger();
            stop_monitor(monitor).await;
            return result.map_err(LifecycleError::Server);
        }
        signal = termination => {
            let signal = signal.map_err(LifecycleError::Signal)?;
            tracing::info!(signal, "Shutting down server...");
        }
    }

    shutdown.trigger();
    handle.graceful_shutdown(None);

    let grace = config.timeouts.shutdown_grace();
    let drained = time::timeout(grace, &mut server).await;
    stop_monitor(monitor).await;

    match drained {
        Ok(result) => {
            result.map_err(LifecycleError::Server)?;
            tracing::info!("Server exited");
            Ok(())
        }
        Err(_) => {
            tracing::error!(grace_secs = grace.as_secs(), "Server forced to shutdown");
            Err(LifecycleError::ShutdownTimedOut(grace))
        }
    }
}

async fn stop_monitor(mut task: JoinHandle<()>) {
    if time::timeout(MONITOR_JOIN_TIMEOUT, &mut task).await.is_err() {
        tracing::warn!("Health monitor did not stop in time, aborting");
        task.abort();
    }
}
