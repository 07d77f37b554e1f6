//! Request handling and transformation.
//!
//! # Responsibilities
//! - Buffer the inbound body (bounded) so a failover hop can replay it
//! - Capture method, path and query for re-targeting at any backend
//! - Apply the forwarding header rewrite once, up front
//!
//! # Design Decisions
//! - The rewrite is backend-independent, so one `ForwardRequest` serves
//!   both the first attempt and the retry
//! - Content-Length over the limit is rejected before reading the body

use std::net::IpAddr;

use axum::body::{Body, Bytes};
use axum::http::{header::CONTENT_LENGTH, HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use crate::security::headers::{apply_forwarding_headers, requested_host};

/// Why an inbound request could not be prepared for forwarding.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = match self {
            RequestError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::Body(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// A fully buffered request, ready to be sent to any backend.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path plus query, e.g. `/notes?limit=5`.
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardRequest {
    /// Consume an inbound request, rewriting its headers for the upstream hop.
    pub async fn from_request(
        request: Request<Body>,
        client_ip: Option<IpAddr>,
        max_body_size: usize,
    ) -> Result<Self, RequestError> {
        let (parts, body) = request.into_parts();

        let declared = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > max_body_size) {
            return Err(RequestError::TooLarge {
                limit: max_body_size,
            });
        }

        let body = axum::body::to_bytes(body, max_body_size)
            .await
            .map_err(|e| classify_body_error(e, max_body_size))?;

        let host = requested_host(&parts.headers, &parts.uri);
        let mut headers = parts.headers;
        apply_forwarding_headers(&mut headers, host, client_ip);

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Ok(Self {
            method: parts.method,
            path_and_query,
            headers,
            body,
        })
    }
}

fn classify_body_error(error: axum::Error, limit: usize) -> RequestError {
    let inner = error.into_inner();
    if inner.downcast_ref::<LengthLimitError>().is_some() {
        RequestError::TooLarge { limit }
    } else {
        RequestError::Body(axum::Error::new(inner))
    }
}
