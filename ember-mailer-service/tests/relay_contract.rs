use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

use ember_mailer_service::handlers::{router, AppState};
use ember_mailer_service::provider::MailProvider;

type Captured = Arc<Mutex<Option<(String, Value)>>>;

#[derive(Clone)]
struct StubState {
    reply: StatusCode,
    body: &'static str,
    captured: Captured,
}

async fn record_handoff(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, &'static str) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    *stub.captured.lock().await = Some((auth, payload));
    (stub.reply, stub.body)
}

/// Stands in for the upstream provider; records the last authenticated call.
async fn spawn_provider(reply: StatusCode, body: &'static str) -> (SocketAddr, Captured) {
    let captured: Captured = Arc::new(Mutex::new(None));
    let app = Router::new()
        .route("/emails", post(record_handoff))
        .with_state(StubState {
            reply,
            body,
            captured: captured.clone(),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind provider stub");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve provider stub") });
    (addr, captured)
}

async fn spawn_relay(provider_addr: SocketAddr) -> SocketAddr {
    let state = AppState {
        provider: MailProvider::new(
            format!("http://{provider_addr}"),
            "test-key",
            "Ember Kitchen <orders@ember.test>",
        ),
    };
    let app = router().with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind relay");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve relay") });
    addr
}

async fn post_json(addr: SocketAddr, path: &str, body: &Value) -> (u16, String) {
    let payload = body.to_string();
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect relay");
    let request = format!(
        "POST {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len(),
    );
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, body.to_string())
}

#[tokio::test]
async fn newsletter_handoff_reaches_the_provider_with_credentials() {
    let (provider_addr, captured) = spawn_provider(StatusCode::OK, r#"{"id":"stub"}"#).await;
    let relay = spawn_relay(provider_addr).await;

    let (status, body) = post_json(
        relay,
        "/api/send-newsletter",
        &json!({"email": "reader@example.com"}),
    )
    .await;
    assert_eq!(status, 200);
    let reply: Value = serde_json::from_str(&body).expect("success json");
    assert_eq!(reply["success"], true);

    let (auth, sent) = captured.lock().await.clone().expect("provider called");
    assert_eq!(auth, "Bearer test-key");
    assert_eq!(sent["from"], "Ember Kitchen <orders@ember.test>");
    assert_eq!(sent["to"], "reader@example.com");
    assert_eq!(sent["subject"], "Welcome to Ember Kitchen!");
    let html = sent["html"].as_str().unwrap_or_default();
    assert!(html.contains("Thanks for subscribing!"));
}

#[tokio::test]
async fn confirmation_handoff_renders_the_itemized_table() {
    let (provider_addr, captured) = spawn_provider(StatusCode::OK, r#"{"id":"stub"}"#).await;
    let relay = spawn_relay(provider_addr).await;

    let (status, body) = post_json(
        relay,
        "/api/send-confirmation",
        &json!({
            "email": "ada@example.com",
            "name": "Ada",
            "orderId": "0a0c5005-3b6f-4c33-a969-11f549a04854",
            "total": "25.00",
            "items": [
                {"title": "Garlic Naan", "quantity": 2, "price": "10.00"},
                {"title": "Mango Lassi", "quantity": 1, "price": "5.00"},
            ],
        }),
    )
    .await;
    assert_eq!(status, 200);
    let reply: Value = serde_json::from_str(&body).expect("success json");
    assert_eq!(reply["success"], true);

    let (_, sent) = captured.lock().await.clone().expect("provider called");
    assert_eq!(sent["to"], "ada@example.com");
    assert_eq!(sent["subject"], "Your Order is Confirmed!");
    let html = sent["html"].as_str().unwrap_or_default();
    assert!(html.contains("Thank you, Ada!"));
    assert!(html.contains("(ID: 0a0c5005-3b6f-4c33-a969-11f549a04854)"));
    assert!(html.contains("Garlic Naan"));
    assert!(html.contains("$20.00"));
    assert!(html.contains("Total: $25.00"));
}

#[tokio::test]
async fn bad_addresses_are_rejected_before_any_provider_call() {
    let (provider_addr, captured) = spawn_provider(StatusCode::OK, r#"{"id":"stub"}"#).await;
    let relay = spawn_relay(provider_addr).await;

    for body in [
        json!({}),
        json!({"email": "not-an-address"}),
        json!({"email": 7}),
    ] {
        let (status, reply) = post_json(relay, "/api/send-newsletter", &body).await;
        assert_eq!(status, 400);
        let reply: Value = serde_json::from_str(&reply).expect("error json");
        assert_eq!(reply["error"], "Invalid email");
    }
    assert!(captured.lock().await.is_none());
}

#[tokio::test]
async fn incomplete_confirmations_are_rejected_before_any_provider_call() {
    let (provider_addr, captured) = spawn_provider(StatusCode::OK, r#"{"id":"stub"}"#).await;
    let relay = spawn_relay(provider_addr).await;

    let complete = json!({
        "email": "ada@example.com",
        "name": "Ada",
        "orderId": "0a0c5005-3b6f-4c33-a969-11f549a04854",
        "total": "25.00",
        "items": [{"title": "Garlic Naan", "quantity": 2, "price": "10.00"}],
    });

    let mut missing_order = complete.clone();
    missing_order.as_object_mut().unwrap().remove("orderId");
    let mut blank_name = complete.clone();
    blank_name["name"] = json!("  ");
    let mut bad_money = complete.clone();
    bad_money["items"][0]["price"] = json!("ten dollars");

    for body in [json!({}), missing_order, blank_name, bad_money] {
        let (status, reply) = post_json(relay, "/api/send-confirmation", &body).await;
        assert_eq!(status, 400);
        let reply: Value = serde_json::from_str(&reply).expect("error json");
        assert_eq!(reply["error"], "Missing or invalid fields");
    }
    assert!(captured.lock().await.is_none());
}

#[tokio::test]
async fn provider_rejection_is_echoed_with_its_raw_body() {
    let (provider_addr, _captured) = spawn_provider(
        StatusCode::PAYMENT_REQUIRED,
        r#"{"message":"insufficient credits"}"#,
    )
    .await;
    let relay = spawn_relay(provider_addr).await;

    let (status, body) = post_json(
        relay,
        "/api/send-newsletter",
        &json!({"email": "reader@example.com"}),
    )
    .await;
    assert_eq!(status, 500);
    let reply: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(reply["error"], r#"{"message":"insufficient credits"}"#);
}
