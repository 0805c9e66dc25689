// Connection handling module
// Serves one accepted TCP connection with hyper's HTTP/1 driver

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::handler::{self, Dispatcher};
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// No timeouts are applied. When the client goes away hyper drops the
/// in-flight response body, which closes the file being streamed.
pub fn spawn_connection(stream: TcpStream, peer_addr: SocketAddr, dispatcher: Arc<Dispatcher>) {
    tokio::spawn(async move {
        logger::log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            handler::handle_request(req, Arc::clone(&dispatcher), peer_addr)
        });

        if let Err(err) = http1::Builder::new()
            .keep_alive(true)
            .serve_connection(io, service)
            .await
        {
            logger::log_connection_error(&err);
        }
    });
}
