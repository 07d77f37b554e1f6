//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at process start
//! - Pick the default level from the `DEBUG` flag
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the built-in default

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given verbosity.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "mesh_balancer=debug,tower_http=debug"
    } else {
        "mesh_balancer=info,tower_http=info"
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(debug: bool) {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(debug).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Read the `DEBUG` flag straight from the environment.
///
/// Logging has to be up before configuration loading so its errors are
/// visible, which means the flag is read ahead of the loader.
pub fn debug_from_env() -> bool {
    std::env::var("DEBUG")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}
