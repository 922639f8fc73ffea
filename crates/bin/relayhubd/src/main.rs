//! # relayhubd: relayhub daemon
//!
//! Composition root that wires the Denkovi integration to the HTTP API.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Set up the Denkovi integration and register what it discovers
//! - Spawn the periodic poll loop
//! - Build the axum router and serve it
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use relayhub_adapter_denkovi::DenkoviIntegration;
use relayhub_adapter_http_axum::state::AppState;
use relayhub_app::poller::spawn_poll_loop;
use relayhub_app::ports::Integration;
use relayhub_app::services::entity_service::EntityService;
use relayhub_app::services::integration_service::IntegrationService;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let board = config
        .denkovi
        .take()
        .ok_or_else(|| ConfigError::Validation("missing [denkovi] section".to_string()))?;

    // Integration
    let mut integration = DenkoviIntegration::new(board);
    let discovered = integration.setup().await?;

    let entities = Arc::new(EntityService::new());
    for device in discovered {
        tracing::info!(
            device = %device.device.name,
            entities = device.entities.len(),
            "registering device"
        );
        entities.register(device).await?;
    }
    let service = IntegrationService::new(Arc::new(integration), entities);

    // Poll loop
    let poller = spawn_poll_loop(service.clone(), config.poll_interval());

    // HTTP
    let app = relayhub_adapter_http_axum::router::build(AppState::new(service.clone()));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "relayhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.abort();
    service.teardown().await?;
    tracing::info!("relayhubd stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
