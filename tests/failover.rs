//! End-to-end behavior of the front door against live mock backends.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{Harness, MockBackend};
use serde_json::Value;

async fn three() -> (MockBackend, MockBackend, MockBackend) {
    (
        MockBackend::start("A").await,
        MockBackend::start("B").await,
        MockBackend::start("C").await,
    )
}

#[tokio::test]
async fn rotation_starts_after_cursor_and_wraps() {
    let (a, b, c) = three().await;
    let lb = Harness::new(&[&a, &b, &c]);

    let mut served = Vec::new();
    for _ in 0..4 {
        let (status, _, body) = lb.get("/").await;
        assert_eq!(status, StatusCode::OK);
        served.push(body);
    }
    assert_eq!(served, ["B", "C", "A", "B"]);
}

#[tokio::test]
async fn dead_backend_fails_over_and_is_marked_down() {
    let (a, b, c) = three().await;
    b.set_up(false);
    let lb = Harness::new(&[&a, &b, &c]);

    let (status, _, body) = lb.get("/notes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "C");

    let (_, _, status_body) = lb.get("/status").await;
    let report: Value = serde_json::from_str(&status_body).unwrap();
    assert_eq!(report["backends"][1]["alive"], false);
    assert_eq!(report["backends"][1]["failure_count"], 1);
    assert_eq!(report["current_index"], 2);

    // B stays out of rotation until a probe brings it back.
    let (_, _, next) = lb.get("/").await;
    let (_, _, after) = lb.get("/").await;
    assert_eq!([next.as_str(), after.as_str()], ["A", "C"]);
}

#[tokio::test]
async fn all_backends_down_is_503() {
    let (a, b, c) = three().await;
    for backend in [&a, &b, &c] {
        backend.set_up(false);
    }
    let lb = Harness::new(&[&a, &b, &c]);

    // First request burns two backends on the failover hop.
    let (status, _, body) = lb.get("/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "Service unavailable");

    let (status, _, _) = lb.get("/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _, _) = lb.get("/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(lb.components.state.pool.eligible_count(), 0);
}

#[tokio::test]
async fn upstream_errors_pass_through_without_failover() {
    let (a, b, c) = three().await;
    b.respond_with(500);
    let lb = Harness::new(&[&a, &b, &c]);

    let (status, _, body) = lb.get("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "B");
    assert_eq!(c.hits(), 0);
    assert!(lb.components.state.pool.get(1).unwrap().is_eligible());
}

#[tokio::test]
async fn recovered_backend_rejoins_after_sweep() {
    let (a, b, c) = three().await;
    b.set_up(false);
    let lb = Harness::new(&[&a, &b, &c]);

    let (_, _, body) = lb.get("/").await;
    assert_eq!(body, "C");
    assert!(!lb.components.state.pool.get(1).unwrap().is_eligible());

    b.set_up(true);
    let report = lb.components.monitor.sweep().await;
    assert_eq!(report.healthy, 3);
    assert_eq!(report.skipped, 0);

    // Cursor is at C; the rotation continues A, B.
    let (_, _, first) = lb.get("/").await;
    let (_, _, second) = lb.get("/").await;
    assert_eq!([first.as_str(), second.as_str()], ["A", "B"]);
}

#[tokio::test]
async fn forwarding_headers_and_request_id() {
    let a = MockBackend::start("A").await;
    let lb = Harness::new(&[&a]);

    let request = Request::builder()
        .uri("/whoami?x=1")
        .header("host", "lb.example")
        .header("x-forwarded-proto", "http")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = lb.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "A");
    assert_eq!(headers["x-seen-forwarded-proto"], "https");
    assert!(headers.contains_key("x-request-id"));
    assert!(!headers.contains_key("connection"));
}

#[tokio::test]
async fn post_body_is_forwarded() {
    let a = MockBackend::start("A").await;
    let lb = Harness::new(&[&a]);

    let request = Request::builder()
        .method("POST")
        .uri("/notes")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"title":"hello"}"#))
        .unwrap();
    let (status, _, body) = lb.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "A");
    assert_eq!(a.hits(), 1);
}
