//! Publishing against an in-process broker.

mod common;

use std::time::Duration;

use common::{closed_url, mock_broker, silent_broker};
use privatepub::{AppError, AppResult, ClientConfig, PubSubClient};
use reqwest::header::HeaderValue;
use serde_json::json;

fn client(server: &str) -> PubSubClient {
    PubSubClient::new(ClientConfig::new(server, "secret")).unwrap()
}

#[tokio::test]
async fn publish_posts_form_encoded_envelope() {
    let (url, handle) = mock_broker(200, r#"[{"successful":true}]"#).await;

    let resp = client(&url).publish_to("/chats/42", "hello & bye").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, r#"[{"successful":true}]"#);

    let req = handle.await.unwrap();
    assert!(req.head.starts_with("POST /faye "));
    assert_eq!(
        req.header("content-type").as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        req.message(),
        json!({
            "channel": "/chats/42",
            "data": { "channel": "/chats/42", "eval": "hello & bye" },
            "ext": { "private_pub_token": "secret" }
        })
    );
}

#[tokio::test]
async fn publish_structured_data() {
    let (url, handle) = mock_broker(200, "[]").await;
    let data = json!({ "name": "David", "message": "hi" });

    client(&url).publish_to("/chats/42", data.clone()).await.unwrap();

    let message = handle.await.unwrap().message();
    assert_eq!(message["data"]["data"], data);
    assert!(message["data"].get("eval").is_none());
}

#[tokio::test]
async fn error_status_is_returned_as_body() {
    let (url, handle) = mock_broker(500, "broker exploded").await;

    let resp = client(&url).publish_to("/chats/42", "hello").await.unwrap();
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body, "broker exploded");
    assert!(!resp.is_success());

    handle.await.unwrap();
}

#[tokio::test]
async fn same_client_recovers_after_transport_failure() {
    let (url, handle) = mock_broker(200, "ok").await;
    let c = client(&url).with_request_hook({
        let attempts = std::sync::atomic::AtomicUsize::new(0);
        move |mut req: reqwest::Request| -> AppResult<reqwest::Request> {
            // First attempt is redirected to a dead port.
            if attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                *req.url_mut() = reqwest::Url::parse(&closed_url()).unwrap();
            }
            Ok(req)
        }
    });

    assert!(c.publish_to("/chats/42", "lost").await.unwrap_err().is_transport());
    let resp = c.publish_to("/chats/42", "delivered").await.unwrap();
    assert_eq!(resp.status, 200);

    let message = handle.await.unwrap().message();
    assert_eq!(message["data"]["eval"], json!("delivered"));
}

#[tokio::test]
async fn request_hook_can_add_headers() {
    let (url, handle) = mock_broker(200, "ok").await;
    let c = client(&url).with_request_hook(|mut req: reqwest::Request| -> AppResult<reqwest::Request> {
        req.headers_mut()
            .insert("x-proxy-auth", HeaderValue::from_static("letmein"));
        Ok(req)
    });

    c.publish_to("/chats/42", "hello").await.unwrap();

    let req = handle.await.unwrap();
    assert_eq!(req.header("x-proxy-auth").as_deref(), Some("letmein"));
}

#[tokio::test]
async fn request_timeout_surfaces_as_transport_error() {
    let (url, handle) = silent_broker().await;
    let config = ClientConfig::new(url, "secret").with_request_timeout(Duration::from_millis(200));
    let c = PubSubClient::new(config).unwrap();

    match c.publish_to("/chats/42", "hello").await {
        Err(AppError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }

    handle.abort();
}

#[tokio::test]
async fn concurrent_publishes_are_independent() {
    let (url_a, handle_a) = mock_broker(200, "a").await;
    let (url_b, handle_b) = mock_broker(200, "b").await;
    let a = client(&url_a);
    let b = client(&url_b);

    let (ra, rb) = tokio::join!(
        a.publish_to("/chats/1", "one"),
        b.publish_to("/chats/2", "two")
    );
    assert_eq!(ra.unwrap().body, "a");
    assert_eq!(rb.unwrap().body, "b");

    handle_a.await.unwrap();
    handle_b.await.unwrap();
}
