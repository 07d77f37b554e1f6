//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use mesh_balancer::config::BalancerConfig;
use mesh_balancer::lifecycle::startup::{self, Components};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// A plain-HTTP backend that answers with its own name.
///
/// While down it accepts and immediately drops connections, so forwards
/// and probes see a transport error.
#[derive(Clone)]
pub struct MockBackend {
    pub name: &'static str,
    pub addr: SocketAddr,
    up: Arc<AtomicBool>,
    status: Arc<AtomicU16>,
    hits: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockBackend {
    pub async fn start(name: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let backend = Self {
            name,
            addr: listener.local_addr().unwrap(),
            up: Arc::new(AtomicBool::new(true)),
            status: Arc::new(AtomicU16::new(200)),
            hits: Arc::new(AtomicUsize::new(0)),
        };

        let shared = backend.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                if !shared.up.load(Ordering::SeqCst) {
                    drop(socket);
                    continue;
                }
                let shared = shared.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let head = String::from_utf8_lossy(&buf[..n]).to_string();
                    if !head.starts_with("GET /health ") {
                        shared.hits.fetch_add(1, Ordering::SeqCst);
                    }

                    let status = shared.status.load(Ordering::SeqCst);
                    let reason = StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or("OK");
                    let proto = header_value(&head, "x-forwarded-proto").unwrap_or_default();
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nX-Seen-Forwarded-Proto: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        shared.name.len(),
                        proto,
                        shared.name
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        backend
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    pub fn respond_with(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    /// Proxied (non-probe) requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

/// Pool, router and monitor wired the way the binary wires them.
#[allow(dead_code)]
pub struct Harness {
    pub router: Router,
    pub components: Components,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(backends: &[&MockBackend]) -> Self {
        let config = BalancerConfig {
            backends: backends.iter().map(|b| b.url()).collect(),
            ..BalancerConfig::default()
        };
        let components = startup::build(&config).unwrap();
        let router = mesh_balancer::build_router(
            components.state.clone(),
            config.timeouts.request(),
        );
        Self { router, components }
    }

    pub async fn get(&self, path: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }
}
