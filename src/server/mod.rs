//! Server runtime: listener setup and the accept loop.

pub mod connection;
pub mod listener;

pub use listener::create_reusable_listener;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerContext;
use crate::logger;

/// Accept connections until the process is stopped. A failed accept
/// is logged and the loop keeps going.
pub async fn run(listener: TcpListener, ctx: Arc<ServerContext>) {
    let connections = Arc::new(AtomicUsize::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                connection::accept_connection(stream, peer_addr, &ctx, &connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
