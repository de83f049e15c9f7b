//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use chaos_fleet::chaos::ChaosCell;
use chaos_fleet::config::{ServiceConfig, ServiceKind};
use chaos_fleet::observability::metrics;
use chaos_fleet::scheduler::Scheduler;
use chaos_fleet::{ServiceServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A service running on an ephemeral port.
#[allow(dead_code)]
pub struct RunningService {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub chaos: Option<ChaosCell>,
    pub scheduler: Option<Scheduler>,
}

#[allow(dead_code)]
impl RunningService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a service with the given configuration on `127.0.0.1:0`.
pub async fn start_service(kind: ServiceKind, config: ServiceConfig) -> RunningService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = metrics::install_recorder().unwrap();
    let server = ServiceServer::new(kind, config, handle).unwrap();
    let chaos = server.chaos().cloned();
    let scheduler = server.scheduler().cloned();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let (_, updates) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let _ = server.run(listener, updates, rx).await;
    });

    RunningService {
        addr,
        shutdown,
        chaos,
        scheduler,
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request path and returns the status and body to send.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]);
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
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

    addr
}
