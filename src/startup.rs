//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;

use crate::application::services::HubHandle;
use crate::config::Settings;
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    hub_task: JoinHandle<()>,
}

/// Build the full router, middleware included
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(CompressionLayer::new())
        .layer(logging::create_trace_layer())
        .layer(cors)
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        // Start the broadcast hub
        let (hub, hub_task) = HubHandle::spawn(settings.hub.command_buffer);
        tracing::info!(
            command_buffer = settings.hub.command_buffer,
            "Broadcast hub spawned"
        );

        let addr = settings
            .server
            .socket_addr()
            .with_context(|| format!("invalid bind address {}", settings.server_addr()))?;

        let state = AppState {
            hub,
            settings: Arc::new(settings),
        };
        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            hub_task,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        // Dropping the router released the last hub handles
        if let Err(e) = self.hub_task.await {
            tracing::warn!(error = %e, "Broadcast hub task ended abnormally");
        }
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
