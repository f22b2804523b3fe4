//! Integration tests for the reqwest transport against an in-process server.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use serde_json::{Value, json};

use portcullis_core::config::ApiConfig;
use portcullis_core::error::ErrorKind;
use portcullis_core::traits::{ApiRequest, HttpMethod, HttpTransport};
use portcullis_http::ReqwestTransport;

async fn echo(method: axum::http::Method, headers: HeaderMap, body: String) -> impl IntoResponse {
    let value_of = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    axum::Json(json!({
        "method": method.as_str(),
        "authorization": value_of(header::AUTHORIZATION.as_str()),
        "csrf": value_of("x-csrf-token"),
        "content_type": value_of(header::CONTENT_TYPE.as_str()),
        "body": body,
    }))
}

async fn serve() -> String {
    let router = Router::new()
        .route("/echo", any(echo))
        .route("/text", get(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream down</html>") }))
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn transport(timeout_seconds: u64) -> ReqwestTransport {
    ReqwestTransport::new(&ApiConfig {
        timeout_seconds,
        ..ApiConfig::default()
    })
    .expect("transport")
}

#[tokio::test]
async fn test_headers_bearer_and_json_body_are_sent() {
    let base = serve().await;
    let request = ApiRequest::new(HttpMethod::Patch, format!("{base}/echo"))
        .header("X-CSRF-Token", "tok-9")
        .bearer("abc.def.ghi")
        .json(json!({"qty": 3}));

    let response = transport(5).send(request).await.expect("send");
    assert!(response.is_success());
    assert_eq!(response.body["method"], "PATCH");
    assert_eq!(response.body["authorization"], "Bearer abc.def.ghi");
    assert_eq!(response.body["csrf"], "tok-9");
    assert_eq!(response.body["content_type"], "application/json");
    assert_eq!(response.body["body"], json!({"qty": 3}));
}

#[tokio::test]
async fn test_plain_get_has_no_body_or_auth() {
    let base = serve().await;
    let response = transport(5)
        .send(ApiRequest::get(format!("{base}/echo")))
        .await
        .expect("send");
    assert_eq!(response.body["method"], "GET");
    assert_eq!(response.body["authorization"], Value::Null);
    assert_eq!(response.body["body"], Value::Null);
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_as_text() {
    let base = serve().await;
    let response = transport(5)
        .send(ApiRequest::get(format!("{base}/text")))
        .await
        .expect("send");
    assert_eq!(response.status, 502);
    assert!(!response.is_success());
    assert_eq!(response.body, Value::String("<html>upstream down</html>".into()));
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let base = serve().await;
    let response = transport(5)
        .send(ApiRequest::get(format!("{base}/empty")))
        .await
        .expect("send");
    assert_eq!(response.status, 204);
    assert_eq!(response.body, Value::Null);
}

#[tokio::test]
async fn test_timeout_is_a_network_error() {
    let base = serve().await;
    let err = transport(1)
        .send(ApiRequest::get(format!("{base}/slow")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}

#[tokio::test]
async fn test_connection_refused_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = transport(5)
        .send(ApiRequest::post(format!("http://{addr}/echo")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}
