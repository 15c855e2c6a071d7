use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assetreg_api::config::{LogFormat, ServerConfig};
use assetreg_api::reference::ReferenceData;
use assetreg_api::router::build_app_router;
use assetreg_api::state::AppState;
use assetreg_api::store::MemoryAssetRepository;
use assetreg_events::{AuditLog, EventBus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "assetreg_api=debug,tower_http=debug,audit=info".into());
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Reference data ---
    let reference = match &config.reference_data_path {
        Some(path) => {
            let data = ReferenceData::load(path)?;
            tracing::info!(path = %path.display(), "Reference data loaded");
            data
        }
        None => {
            tracing::info!("No REFERENCE_DATA_PATH set, using built-in reference data");
            ReferenceData::seed()
        }
    };
    tracing::info!(
        depreciation_groups = reference.depreciation_groups.len(),
        roles = reference.roles.len(),
        "Reference data ready",
    );

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let audit_handle = tokio::spawn(AuditLog::run(event_bus.subscribe()));
    tracing::info!("Event bus created, audit log started");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        repo: Arc::new(MemoryAssetRepository::new()),
        reference: Arc::new(reference),
        event_bus: Arc::clone(&event_bus),
    };

    // --- Router ---
    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let host = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and its state clone of the bus) is gone; dropping the last
    // sender closes the channel and lets the audit log drain.
    drop(event_bus);
    match tokio::time::timeout(Duration::from_secs(5), audit_handle).await {
        Ok(Ok(logged)) => tracing::info!(logged, "Audit log stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Audit log task failed"),
        Err(_) => tracing::warn!("Audit log did not stop within 5s"),
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
