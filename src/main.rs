use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sales_api::{
    auth::Authenticator,
    config,
    database::Database,
    handlers::{self, AppState},
    metrics::{self, Metrics},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sales_api=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("shutting down, error: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Sales API in {:?} mode", config.environment);
    info!(database = ?config.database, server = ?config.server, "Configuration loaded");

    let authenticator = Authenticator::from_key_files(
        &config.auth.private_key_file,
        &config.auth.public_key_file,
        &config.auth.key_id,
        &config.auth.algorithm,
    )
    .context("constructing authenticator")?;

    let db = Database::open(&config.database).context("opening database")?;
    let metrics = Metrics::new();

    // Debug listener: metrics only, never exposed with the API
    let debug_listener = TcpListener::bind(&config.server.debug_addr)
        .await
        .with_context(|| format!("binding debug listener {}", config.server.debug_addr))?;
    info!("Debug service listening on {}", config.server.debug_addr);
    let debug_app = metrics::debug_router(metrics.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(debug_listener, debug_app).await {
            warn!("Debug service ended: {}", e);
        }
    });

    let state = AppState::new(db.clone(), Arc::new(authenticator));
    let app = handlers::api(
        state,
        metrics,
        config.server.max_body_bytes,
        config.server.request_timeout(),
    )
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("binding api listener {}", config.server.addr))?;
    info!("API listening on {}", config.server.addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined.context("api task")?.context("serving api")?;
        }
        _ = shutdown_signal() => {
            info!("Start shutdown");
            let _ = shutdown_tx.send(());

            let grace = config.server.shutdown_grace();
            match tokio::time::timeout(grace, &mut server).await {
                Ok(joined) => joined.context("api task")?.context("graceful shutdown")?,
                Err(_) => {
                    warn!("Graceful shutdown did not complete in {:?}, closing connections", grace);
                    server.abort();
                }
            }
        }
    }

    db.close().await;
    info!("Completed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
