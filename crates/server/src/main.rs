//! Mediqueue realtime push service.
//!
//! Tracks live push channels in a durable connection registry and fans
//! clinic queue events out to them through the platform push gateway.

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod gateway;
mod middleware;
mod publisher;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testutil;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediqueue_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    let bind_addr = config.bind_addr.clone();

    // Initialize the connection registry and gateway client
    let db = db::init_database(&config.db_path)?;
    let store = Arc::new(store::AuroraConnectionStore::new(Arc::new(db)));
    let gateway = Arc::new(gateway::HttpPushGateway::new(
        config.gateway_url.clone(),
        config.deliver_timeout,
    ));
    let state = AppState::new(config, store, gateway);

    // Build router
    let app = Router::new()
        // Push channel lifecycle (invoked by the platform gateway)
        .route("/realtime/connect", post(routes::lifecycle::connect))
        .route("/realtime/disconnect", post(routes::lifecycle::disconnect))
        .route("/realtime/frame", post(routes::lifecycle::frame))
        // Internal surface (invoked by the clinic backend)
        .route("/internal/events", post(routes::events::publish_event))
        .route("/internal/connections", get(routes::events::list_connections))
        .route("/healthz", get(routes::events::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
