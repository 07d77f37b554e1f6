//! Network layer: TLS termination for the public listener.
//!
//! Connections are accepted by `axum-server`; this module only turns
//! certificate and key files into its rustls configuration.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
