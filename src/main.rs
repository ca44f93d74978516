//! Starter App Server - Main Application Entry Point
//!
//! Serves the HTTP surface of the starter app on top of a PostgreSQL pool whose
//! lifecycle depends on the execution context (`APP_ENV`).
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Initialize the data layer (create, reuse or register the pool)
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port
//!
//! In development, SIGHUP re-runs steps 2-4 without restarting the process.
//! The pool is reused from the process cache instead of being opened again.

use starter_app::{
    app,
    config::Config,
    context::ExecutionContext,
    db::{PgConnector, cache::DevPoolCache, hook::SignalDrainHook, supervisor::PoolSupervisor},
};
use tracing_subscriber::EnvFilter;

/// What ended a serving cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Shutdown,
    Reload,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber.
    // Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // In production the SIGTERM that stops the server also triggers the pool drain.
    // The drain waits for this to fire, which happens once in-flight requests are done.
    let (served_tx, served_rx) = tokio::sync::oneshot::channel::<()>();
    let mut served_tx = Some(served_tx);
    let hook = SignalDrainHook::new().drain_after(async move {
        let _ = served_rx.await;
    });
    let supervisor = PoolSupervisor::new(PgConnector, hook, DevPoolCache::process());
    let addr = format!("0.0.0.0:{}", config.server_port);

    loop {
        // Any initialization error aborts startup
        let layer = supervisor.initialize(&config).await?;
        let context = layer.context;
        tracing::info!(%context, reused = layer.reused, "Data layer ready");

        let app = app::router(layer.clone());

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Server listening on {}", addr);

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let stop = wait_for_stop(context).await;
                let _ = stop_tx.send(stop);
            })
            .await?;

        match stop_rx.await.unwrap_or(Stop::Shutdown) {
            Stop::Reload => {
                tracing::info!("Reloading");
                continue;
            }
            Stop::Shutdown => {
                if let Some(served_tx) = served_tx.take() {
                    let _ = served_tx.send(());
                }
                layer.shutdown().await;
                tracing::info!("Server stopped");
                return Ok(());
            }
        }
    }
}

/// Wait for Ctrl-C / SIGTERM, or SIGHUP in development.
async fn wait_for_stop(context: ExecutionContext) -> Stop {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => Stop::Shutdown,
        stop = unix_signals(context) => stop,
    }
}

#[cfg(unix)]
async fn unix_signals(context: ExecutionContext) -> Stop {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut terminate, mut hangup) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
    ) {
        (Ok(terminate), Ok(hangup)) => (terminate, hangup),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to install signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    loop {
        tokio::select! {
            _ = terminate.recv() => return Stop::Shutdown,
            _ = hangup.recv() => {
                if context.caches_pool() {
                    return Stop::Reload;
                }
                tracing::warn!(%context, "Ignoring SIGHUP, reload only happens in development");
            }
        }
    }
}

#[cfg(not(unix))]
async fn unix_signals(_context: ExecutionContext) -> Stop {
    std::future::pending().await
}
