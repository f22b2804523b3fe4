//! Integration tests for CSRF protection against a live backend.

mod helpers;

use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use portcullis_core::error::ErrorKind;
use portcullis_core::traits::HttpMethod;
use portcullis_core::types::CsrfToken;

use helpers::{MockBackend, Stack, config_for, user};

async fn signed_in(backend: &MockBackend) -> Stack {
    backend.add_account("pw", user("ana", &["invoice.create"]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("ana", "pw").await.expect("login");
    stack
}

fn create_invoice(stack: &Stack) -> portcullis_core::traits::ApiRequest {
    let token = stack.session.token().expect("token");
    stack
        .client
        .request(HttpMethod::Post, "/invoices")
        .bearer(token)
        .json(json!({"customer": "acme", "total": 120}))
}

#[tokio::test]
async fn test_mutating_request_carries_token_once() {
    let backend = MockBackend::start().await;
    let stack = signed_in(&backend).await;

    let response = stack.client.send(create_invoice(&stack)).await.expect("create");
    assert_eq!(response.status, 201);
    assert_eq!(backend.hits("POST /invoices"), 1);
    // Fetched once for login, reused afterwards.
    assert_eq!(backend.csrf_issued(), 1);
}

#[tokio::test]
async fn test_get_is_sent_once_without_token_fetch() {
    let backend = MockBackend::start().await;
    let stack = Stack::new(config_for(&backend.base_url));

    let response = stack
        .client
        .send(stack.client.request(HttpMethod::Get, "/invoices"))
        .await
        .expect("list");
    assert_eq!(response.status, 200);
    assert_eq!(backend.hits("GET /invoices"), 1);
    assert_eq!(backend.csrf_issued(), 0);
}

#[tokio::test]
async fn test_rotated_token_is_refreshed_and_retried_once() {
    let backend = MockBackend::start().await;
    let stack = signed_in(&backend).await;
    backend.rotate_csrf();

    let response = stack.client.send(create_invoice(&stack)).await.expect("create");
    assert_eq!(response.status, 201);
    assert_eq!(backend.hits("POST /invoices"), 2);
    assert_eq!(backend.csrf_issued(), 2);
}

#[tokio::test]
async fn test_second_rejection_surfaces_csrf_error() {
    let backend = MockBackend::start().await;
    let stack = signed_in(&backend).await;
    backend.reject_next_csrf(5);

    let err = stack.client.send(create_invoice(&stack)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CsrfRejected);
    assert_eq!(err.status, Some(403));
    assert_eq!(backend.hits("POST /invoices"), 2);
}

#[tokio::test]
async fn test_failed_fetch_keeps_stale_token() {
    let backend = MockBackend::start().await;
    let stack = Stack::new(config_for(&backend.base_url));
    let cookie_name = stack.csrf.config().cookie_name.clone();

    let stale = CsrfToken {
        value: "previous".to_string(),
        issued_at: Utc::now() - chrono::Duration::hours(2),
        ttl_seconds: 3600,
    };
    stack
        .storage
        .set(&cookie_name, &stale.to_cookie(&cookie_name))
        .expect("seed");

    backend.set_csrf_down(true);
    let token = stack.csrf.ensure_token().await.expect("stale token");
    assert_eq!(token.value, "previous");
    assert_eq!(stack.csrf.get_token().expect("cookie").value, "previous");
    assert_eq!(backend.hits("GET /csrf-token"), 1);

    let err = stack.csrf.fetch_token().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Api);
    assert_eq!(err.status, Some(500));
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_refresh() {
    let backend = MockBackend::start().await;
    let stack = Stack::new(config_for(&backend.base_url));

    let tokens = futures::future::join_all((0..8).map(|_| stack.csrf.fetch_token())).await;
    let values: Vec<String> = tokens
        .into_iter()
        .map(|t| t.expect("token").value)
        .collect();

    assert!(values.iter().all(|v| v == "csrf-1"), "{values:?}");
    assert_eq!(backend.csrf_issued(), 1);
}

#[tokio::test]
async fn test_refresher_runs_until_shutdown() {
    let backend = MockBackend::start().await;
    let stack = Stack::new(config_for(&backend.base_url));

    let refresher = stack
        .csrf
        .spawn_refresher(Duration::from_millis(40))
        .expect("refresher");
    tokio::time::sleep(Duration::from_millis(220)).await;
    assert!(refresher.is_running());
    refresher.shutdown().await;

    let issued = backend.csrf_issued();
    assert!(issued >= 2, "issued {issued}");
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(backend.csrf_issued(), issued);
}

#[tokio::test]
async fn test_dropping_refresher_stops_it() {
    let backend = MockBackend::start().await;
    let stack = Stack::new(config_for(&backend.base_url));

    {
        let _refresher = stack
            .csrf
            .spawn_refresher(Duration::from_millis(30))
            .expect("refresher");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    let issued = backend.csrf_issued();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(backend.csrf_issued(), issued);
}
