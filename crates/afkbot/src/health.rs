//! Minimal HTTP health endpoint.
//!
//! Hosting platforms that put idle apps to sleep ping `/` to keep the
//! process alive; the body is a fixed string.

use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

pub const HEALTH_BODY: &str = "Bot has arrived";

pub fn router() -> Router {
    Router::new().route("/", get(|| async { HEALTH_BODY }))
}

/// Binds the health port on all interfaces.
///
/// Done before anything else starts so a taken port fails startup.
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await
}

/// Serves [`router`] until the listener fails.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "health endpoint listening");
    }
    axum::serve(listener, router()).await
}
