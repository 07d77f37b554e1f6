//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (schema.rs)
//!     → optional TOML file named by LB_CONFIG (loader.rs)
//!     → environment overrides: BACKENDS, PORT, TLS_CERT, TLS_KEY, DEBUG
//!     → validation.rs (semantic checks, every error collected)
//!     → BalancerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend set is fixed at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{from_env, from_lookup, ConfigError};
pub use schema::{
    BalancerConfig, CircuitBreakerConfig, HealthCheckConfig, ListenerConfig, TimeoutConfig,
};
pub use validation::{backend_urls, parse_backend_url, validate_config, ValidationError};
