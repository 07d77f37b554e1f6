//! Header manipulation for forwarded traffic.
//!
//! # Responsibilities
//! - Add X-Forwarded-Host, X-Forwarded-Proto, X-Real-IP, X-Forwarded-For
//! - Strip hop-by-hop headers in both directions
//!
//! # Design Decisions
//! - Preserve original client IP in X-Forwarded-For (appended)
//! - X-Forwarded-Host, X-Forwarded-Proto and X-Real-IP are always overwritten
//! - The inbound Host header is dropped; the client sets the backend's

use std::net::IpAddr;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION, HOST};
use axum::http::Uri;

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// Headers that describe a single connection and must not be forwarded.
pub const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// The host the client addressed: `Host` for HTTP/1, `:authority` for h2.
pub fn requested_host(headers: &HeaderMap, uri: &Uri) -> Option<HeaderValue> {
    headers.get(HOST).cloned().or_else(|| {
        uri.authority()
            .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
    })
}

/// Rewrite inbound request headers for the upstream hop.
pub fn apply_forwarding_headers(
    headers: &mut HeaderMap,
    host: Option<HeaderValue>,
    client_ip: Option<IpAddr>,
) {
    strip_hop_by_hop(headers);

    headers.remove(HOST);
    match host {
        Some(host) => headers.insert(X_FORWARDED_HOST, host),
        None => headers.remove(X_FORWARDED_HOST),
    };
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));

    let Some(ip) = client_ip else {
        headers.remove(X_REAL_IP);
        return;
    };
    let ip = ip.to_string();

    let forwarded_for = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) if !prior.trim().is_empty() => format!("{}, {}", prior, ip),
        _ => ip.clone(),
    };
    if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
        headers.insert(X_FORWARDED_FOR, value);
    }
    if let Ok(value) = HeaderValue::from_str(&ip) {
        headers.insert(X_REAL_IP, value);
    }
}
