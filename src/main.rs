//! matchmaking-gateway server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket matchmaking endpoint and
//! the operational REST endpoints.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use matchmaking_gateway::app_state::AppState;
use matchmaking_gateway::config::{GatewayConfig, LogFormat};
use matchmaking_gateway::domain::{EventBus, ParticipantRegistry};
use matchmaking_gateway::persistence::{InMemoryMatchStore, MatchStore, PostgresMatchStore};
use matchmaking_gateway::router::build_app;
use matchmaking_gateway::service::alerts::spawn_alert_logger;
use matchmaking_gateway::service::{
    BackoffPolicy, Notifier, PairingCoordinator, SchedulerConfig, spawn_scheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e).context("invalid configuration"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting matchmaking-gateway");

    // Build persistence layer
    let store: Arc<dyn MatchStore> = if config.persistence_enabled {
        Arc::new(PostgresMatchStore::connect_lazy(&config).context("can't configure database")?)
    } else {
        tracing::warn!("persistence disabled, match records are kept in memory");
        Arc::new(InMemoryMatchStore::with_capacity(config.memory_store_capacity))
    };

    // Build domain layer
    let registry = Arc::new(ParticipantRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let _alerts = spawn_alert_logger(&event_bus);

    // Build service layer
    let notifier = Notifier::new(BackoffPolicy::new(
        config.notify_initial_delay(),
        config.notify_max_delay(),
    ));
    let coordinator = Arc::new(PairingCoordinator::new(
        registry,
        store,
        notifier,
        event_bus.clone(),
    ));

    let shutdown = CancellationToken::new();
    let scheduler = SchedulerConfig::from_gateway(&config)
        .map(|cfg| spawn_scheduler(Arc::clone(&coordinator), cfg, shutdown.clone()));

    // Build application state
    let app_state = AppState {
        coordinator,
        event_bus,
    };
    let app = build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("can't bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
            signal.cancel();
        })
        .await
        .context("server error")?;

    shutdown.cancel();
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }

    Ok(())
}
