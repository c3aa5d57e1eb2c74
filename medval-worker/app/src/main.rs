//! Media validation worker.
//!
//! Serves `POST /events`, which takes a batch of queue messages carrying
//! storage change notifications and reports how many of them parsed.
//!
//! ```bash
//! # defaults, optionally overridden by ./config.yaml
//! medval
//!
//! # environment overrides
//! APP_SERVER__PORT=9000 APP_LOGGING__JSON=true medval
//! ```

mod config;
mod logging;

use anyhow::Context;
use medval_core::{diagnostics::TracingSink, processor::EventProcessorBuilder};
use medval_http::{create_router_with_body_limit, AppState};
use std::{future::IntoFuture, sync::Arc, time::Duration};
use tokio::{signal, sync::oneshot};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::load().context("invalid configuration")?;
    logging::init(&config.logging).context("failed to initialize logging")?;

    match &config.source {
        Some(path) => info!(path = %path.display(), "loaded configuration file"),
        None => info!("config file not found, using defaults and environment variables"),
    }

    if let Err(err) = run(config).await {
        error!("{err:#}");
        return Err(err);
    }
    Ok(())
}

async fn run(config: config::AppConfig) -> anyhow::Result<()> {
    let processor = EventProcessorBuilder::new()
        .sink(Arc::new(TracingSink))
        .build()
        .context("failed to build event processor")?;
    let router =
        create_router_with_body_limit(AppState::new(processor), config.server.body_limit);

    // Accepts hostnames as well as IP literals.
    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind listener on {address}"))?;
    let addr = listener
        .local_addr()
        .context("failed to read listener address")?;
    info!(%addr, version = env!("CARGO_PKG_VERSION"), "server starting");

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    let shutting_down = tokio::select! {
        result = &mut server => {
            result.context("server stopped with an error")?;
            false
        }
        _ = &mut shutdown_rx => true,
    };

    if shutting_down {
        info!("shutting down server");
        drain(server, config.server.shutdown_timeout).await?;
    }

    info!("server exited");
    Ok(())
}

/// Waits for in-flight requests to finish, giving up after `timeout`.
async fn drain<F>(server: F, timeout: Duration) -> anyhow::Result<()>
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match tokio::time::timeout(timeout, server).await {
        Ok(result) => result.context("server stopped with an error"),
        Err(_) => {
            warn!(?timeout, "server forced to shutdown");
            Ok(())
        }
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("received SIGTERM, initiating graceful shutdown"),
    }
}
