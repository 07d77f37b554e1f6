//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection
//!     → server.rs (router, middleware, proxy handler)
//!     → request.rs (buffer body, rewrite forwarding headers)
//!     → [selector picks a backend]
//!     → upstream.rs (send to that backend, bounded header wait)
//!     → response.rs (stream back, strip hop-by-hop)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use server::{build_router, AppState};
