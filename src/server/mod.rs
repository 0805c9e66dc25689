// Server module entry point
// Accept loop, per-connection serving, and shutdown handling

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::handler::Dispatcher;
use crate::logger;

pub use listener::create_listener;
pub use signal::shutdown_signal;

/// Accept connections until `shutdown` resolves.
///
/// Connections already being served keep running in their own tasks.
pub async fn run(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::spawn_connection(stream, peer_addr, Arc::clone(&dispatcher));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => {
                logger::log_shutdown();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Cli, Config};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hello world").unwrap();

        let cli = Cli {
            root: Some(dir.path().to_path_buf()),
            ..Cli::default()
        };
        let mut cfg = Config::load_from("statiserver-test-config-that-does-not-exist", &cli).unwrap();
        cfg.logging.access_log = false;
        let dispatcher = Arc::new(Dispatcher::new(&cfg).unwrap());

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run(listener, dispatcher, async {
            let _ = stop_rx.await;
        }));

        let response = raw_request(
            addr,
            "GET /hello.txt HTTP/1.1\r\nHost: localhost\r\nRange: bytes=6-\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 206 Partial Content"));
        assert!(response.contains("etag: 11"));
        assert!(response.ends_with("\r\n\r\nworld"));

        let response = raw_request(
            addr,
            "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error"));

        stop_tx.send(()).unwrap();
        server.await.unwrap();
    }
}
