//! HTTP server startup helpers shared by every service binary

use std::net::SocketAddr;

use axum::Router;
use chrono::{DateTime, Utc};
use tokio::signal;
use tracing::info;

/// Bind `host:port` and serve `app` until Ctrl+C or SIGTERM.
pub async fn serve(app: Router, host: &str, port: u16) -> crate::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| crate::Error::Config(format!("Invalid bind address {}:{}: {}", host, port, e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

/// Whole seconds elapsed since `started`, never negative
pub fn uptime_seconds(started: DateTime<Utc>) -> u64 {
    Utc::now()
        .signed_duration_since(started)
        .num_seconds()
        .max(0) as u64
}
