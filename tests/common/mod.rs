//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use logistics_gateway::config::schema::{GatewayConfig, UpstreamConfig};
use logistics_gateway::lifecycle::Shutdown;
use logistics_gateway::HttpServer;

/// Start a simple mock upstream that returns a fixed 200 response.
#[allow(dead_code)]
pub async fn start_mock_upstream(addr: SocketAddr, response: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a programmable mock upstream with async support.
#[allow(dead_code)]
pub async fn start_programmable_upstream<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Gateway configuration pointed at test upstreams.
#[allow(dead_code)]
pub fn test_config(bind: SocketAddr, upstreams: &[(&str, SocketAddr)]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = bind.to_string();
    config.upstreams = upstreams
        .iter()
        .map(|(name, addr)| UpstreamConfig {
            name: name.to_string(),
            base_url: format!("http://{addr}"),
        })
        .collect();
    config.stock.base_url = "http://127.0.0.1:1".to_string();
    config.keycloak.url = "http://127.0.0.1:1".to_string();
    config.keycloak.realm = "logistics".to_string();
    config.keycloak.client_id = "operator-gateway".to_string();
    config
}

/// Spawn a gateway and give it a moment to come up. Returns the shutdown
/// handle so tests can stop it.
#[allow(dead_code)]
pub async fn spawn_gateway(config: GatewayConfig) -> Shutdown {
    let bind: SocketAddr = config.listener.bind_address.parse().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();

    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(bind).await.unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown
}

/// A reqwest client that ignores proxy env vars and connection pooling.
#[allow(dead_code)]
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
