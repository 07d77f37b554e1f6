//! Response handling and transformation.
//!
//! # Responsibilities
//! - Stream the backend response back to the client verbatim
//! - Strip hop-by-hop headers from the upstream response
//! - Produce the plain-text 503 used when no backend can serve
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Status and end-to-end headers pass through unchanged, 5xx included

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::security::headers::strip_hop_by_hop;

/// Body text of the 503 returned when nothing can take the request.
pub const UNAVAILABLE_BODY: &str = "Service unavailable";

/// Turn an upstream response into a client response without buffering.
pub fn from_upstream(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

pub fn service_unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_BODY).into_response()
}
