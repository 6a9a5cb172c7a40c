use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::post,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig, ErrorResponse};

async fn echo(body: String) -> String {
    body
}

fn routes() -> Router {
    Router::new().route("/echo", post(echo))
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let app = ApiIngress::default().build_router(routes());

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_path_yields_json_404() {
    let app = ApiIngress::default().build_router(routes());

    let resp = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(err, ErrorResponse::new("not found"));
}

#[tokio::test]
async fn cors_headers_follow_configuration() {
    let preflight = || {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/echo")
            .header(header::ORIGIN, "https://example.org")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let enabled = ApiIngress::default().build_router(routes());
    let resp = enabled.oneshot(preflight()).await.unwrap();
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let disabled = ApiIngress::new(ApiIngressConfig {
        cors_enabled: false,
        ..Default::default()
    })
    .build_router(routes());
    let resp = disabled.oneshot(preflight()).await.unwrap();
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let ingress = ApiIngress::new(ApiIngressConfig {
        body_limit_bytes: 16,
        ..Default::default()
    });
    let app = ingress.build_router(routes());

    let payload = "x".repeat(64);
    let resp = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/echo")
                .header(header::CONTENT_LENGTH, payload.len())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[test]
fn config_is_kept_as_given() {
    assert!(ApiIngress::default().config().cors_enabled);

    let ingress = ApiIngress::new(ApiIngressConfig {
        cors_enabled: false,
        ..Default::default()
    });
    assert!(!ingress.config().cors_enabled);
    assert_eq!(ingress.config().request_timeout_secs, 30);
}

#[tokio::test]
async fn serves_until_cancelled() {
    let ingress = std::sync::Arc::new(ApiIngress::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();

    let server = {
        let ingress = ingress.clone();
        let cancel = cancel.clone();
        let router = ingress.build_router(routes());
        tokio::spawn(async move { ingress.serve_on(listener, router, cancel).await })
    };

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    assert!(raw.starts_with("HTTP/1.1 200"), "unexpected response: {raw}");
    assert!(raw.contains("healthy"));

    cancel.cancel();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .expect("server should stop after cancellation")
        .unwrap();
    assert!(result.is_ok());
}
