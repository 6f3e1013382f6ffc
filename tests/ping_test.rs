use std::net::SocketAddr;

use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode, header};
use ping_gate::models::Message;
use ping_gate::{AppState, Error, LimiterConfig, router};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn ping_from(addr: &str) -> Request<Body> {
    let addr: SocketAddr = addr.parse().unwrap();
    Request::builder()
        .uri("/ping")
        .extension(ConnectInfo(addr))
        .body(Body::empty())
        .unwrap()
}

async fn body_message(response: axum::response::Response) -> Message {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn greets_admitted_client() {
    let app = router(&AppState::new(LimiterConfig::default()), false);

    let response = app.oneshot(ping_from("10.0.0.1:5000")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(body_message(response).await, Message::greeting());
}

#[tokio::test]
async fn fifth_rapid_request_is_rejected() {
    let state = AppState::new(LimiterConfig::default());
    let app = router(&state, false);

    for i in 0..4 {
        let response = app.clone().oneshot(ping_from("10.0.0.1:5000")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {i} should pass");
    }

    let response = app.oneshot(ping_from("10.0.0.1:5000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let message = body_message(response).await;
    assert_eq!(message.status, "Request failed");
    assert_eq!(message.body, "the API is at capacity");
}

#[tokio::test]
async fn port_is_not_part_of_identity() {
    let state = AppState::new(LimiterConfig::default());
    let app = router(&state, false);

    for port in 5000..5004 {
        let response = app.clone().oneshot(ping_from(&format!("10.0.0.1:{port}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(ping_from("10.0.0.1:6000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // another host is unaffected
    let response = app.oneshot(ping_from("[::1]:5000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(state.registry.len(), 2);
    assert!(state.registry.contains("10.0.0.1"));
    assert!(state.registry.contains("::1"));
}

#[tokio::test]
async fn any_method_reaches_ping() {
    let app = router(&AppState::new(LimiterConfig::default()), false);
    let addr: SocketAddr = "10.0.0.7:1".parse().unwrap();

    for method in [Method::GET, Method::POST, Method::DELETE] {
        let request = Request::builder()
            .method(method.clone())
            .uri("/ping")
            .extension(ConnectInfo(addr))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{method} should be served");
    }
}

#[tokio::test]
async fn missing_client_address_is_server_error() {
    let state = AppState::new(LimiterConfig::default());
    let app = router(&state, false);

    let request = Request::builder().uri("/ping").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn metrics_only_when_exposed() {
    let state = AppState::new(LimiterConfig::default());

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = router(&state, false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = router(&state, true);
    app.clone().oneshot(ping_from("10.0.0.1:5000")).await.unwrap();

    // not rate limited, and needs no client address
    for _ in 0..10 {
        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
        assert!(text.contains("ping_gate_requests_total"));
    }
}

#[tokio::test]
async fn end_to_end_over_tcp() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(ping_gate::serve(
        listener,
        AppState::new(LimiterConfig::default()),
        false,
        shutdown.clone(),
    ));

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let url = format!("http://{addr}/ping");

    for _ in 0..4 {
        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let message: Message = response.json().await.unwrap();
        assert_eq!(message, Message::greeting());
    }

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    let message: Message = response.json().await.unwrap();
    assert_eq!(message, Message::at_capacity());

    // release pooled keep-alive connections so graceful shutdown can finish
    drop(client);
    shutdown.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn bind_to_busy_port_fails() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();

    match ping_gate::bind(addr).await {
        Err(Error::Bind { addr: failed, .. }) => assert_eq!(failed, addr),
        other => panic!("expected a bind error, got {:?}", other.map(|_| ())),
    }
}
