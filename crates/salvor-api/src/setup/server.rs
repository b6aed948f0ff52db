//! Server startup and graceful shutdown

use anyhow::{Context, Result};
use axum::Router;
use salvor_core::Config;
use std::future::Future;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let shutdown = shutdown_signal().context("Failed to install shutdown signal handlers")?;

    let addr = format!("0.0.0.0:{}", config.server_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        addr = %addr,
        max_upload_mb = config.max_upload_size_bytes() / 1024 / 1024,
        photorec_path = %config.photorec_path(),
        harvest_delay_secs = config.harvest_delay().as_secs(),
        recovery_timeout_secs = ?config.recovery_timeout().map(|d| d.as_secs()),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Future that resolves on SIGINT, or SIGTERM on unix.
///
/// Handlers are registered before this returns, so a platform that refuses
/// them fails startup instead of the running server.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Ctrl+C listener failed");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let signal = tokio::select! {
            _ = interrupt => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        };

        #[cfg(not(unix))]
        let signal = {
            interrupt.await;
            "Ctrl+C"
        };

        tracing::info!(signal, "Shutting down gracefully");

        salvor_infra::shutdown_telemetry().await;
    })
}
