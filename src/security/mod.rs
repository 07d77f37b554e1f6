//! Security subsystem.
//!
//! # Responsibilities
//! - Control which headers cross the proxy boundary (headers.rs)
//!
//! # Design Decisions
//! - Client-supplied forwarding headers are overwritten, never trusted
//! - TLS termination lives in `net::tls`; this module only shapes headers

pub mod headers;
