//! Forwarding and correlation tests for the operator gateway.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use uuid::Uuid;

mod common;

#[tokio::test]
async fn test_request_id_generated_and_body_relayed() {
    let upstream_addr: SocketAddr = "127.0.0.1:29181".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29182".parse().unwrap();

    common::start_mock_upstream(upstream_addr, "{\"items\":[]}").await;
    let config = common::test_config(gateway_addr, &[("config", upstream_addr)]);
    let shutdown = common::spawn_gateway(config).await;

    let client = common::test_client();
    let res = client
        .get(format!("http://{gateway_addr}/config/items"))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    let id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("response must carry x-request-id")
        .to_string();
    assert!(Uuid::parse_str(&id).is_ok(), "generated id must be UUID v4: {id}");
    assert_eq!(res.text().await.unwrap(), "{\"items\":[]}");

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_echoed_unchanged() {
    let upstream_addr: SocketAddr = "127.0.0.1:29281".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29282".parse().unwrap();

    common::start_mock_upstream(upstream_addr, "ok").await;
    let config = common::test_config(gateway_addr, &[("shipping", upstream_addr)]);
    let shutdown = common::spawn_gateway(config).await;

    let client = common::test_client();
    let res = client
        .get(format!("http://{gateway_addr}/shipping/orders/7"))
        .header("x-request-id", "operator-trace-42")
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(
        res.headers().get("x-request-id").unwrap(),
        "operator-trace-42"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_returns_502_json() {
    // Nothing listens on the upstream port.
    let upstream_addr: SocketAddr = "127.0.0.1:29381".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29382".parse().unwrap();

    let config = common::test_config(gateway_addr, &[("stock", upstream_addr)]);
    let shutdown = common::spawn_gateway(config).await;

    let client = common::test_client();
    let res = client
        .get(format!("http://{gateway_addr}/stock/levels"))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 502);
    assert!(res.headers().get("x-request-id").is_some());
    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("application/json"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "DependencyUnavailableError");
    assert_eq!(body["statusCode"], 502);
    assert!(body["message"].as_str().unwrap().contains("stock"));
    assert!(body["timestamp"].is_string());
    // Internal transport detail must not leak.
    assert!(!body["message"].as_str().unwrap().contains("tcp"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let gateway_addr: SocketAddr = "127.0.0.1:29482".parse().unwrap();

    let config = common::test_config(gateway_addr, &[]);
    let shutdown = common::spawn_gateway(config).await;

    let client = common::test_client();
    let res = client
        .get(format!("http://{gateway_addr}/billing/invoices"))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 404);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "NotFoundError");
    assert!(body.get("message").is_some());
    assert!(body.get("timestamp").is_some());

    shutdown.trigger();
}

#[tokio::test]
async fn test_slow_upstream_resolves_as_502_within_timeout() {
    let upstream_addr: SocketAddr = "127.0.0.1:29581".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29582".parse().unwrap();

    common::start_programmable_upstream(upstream_addr, move || async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, "too late".into())
    })
    .await;

    let mut config = common::test_config(gateway_addr, &[("shipping", upstream_addr)]);
    config.timeouts.forward_secs = 1;
    let shutdown = common::spawn_gateway(config).await;

    let client = common::test_client();
    let start = Instant::now();
    let res = client
        .get(format!("http://{gateway_addr}/shipping/orders"))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 502);
    assert!(res.headers().get("x-request-id").is_some());
    assert!(
        start.elapsed() < Duration::from_secs(4),
        "gateway must not wait out the slow upstream"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_post_bodies_forwarded() {
    let upstream_addr: SocketAddr = "127.0.0.1:29681".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29682".parse().unwrap();

    common::start_mock_upstream(upstream_addr, "created").await;
    let config = common::test_config(gateway_addr, &[("shipping", upstream_addr)]);
    let shutdown = common::spawn_gateway(config).await;

    let client = common::test_client();
    let res = client
        .post(format!("http://{gateway_addr}/shipping/orders"))
        .json(&serde_json::json!({"sku": "A1", "qty": 3}))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "created");

    shutdown.trigger();
}
