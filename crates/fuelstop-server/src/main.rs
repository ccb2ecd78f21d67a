//! Fuel-stop planning server: cheapest refueling stops along a US
//! driving route, within the vehicle's range.

mod api;
mod config;
mod data;
mod error;
mod geocode;
mod providers;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fuelstop_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting fuel-stop server...");

    let config = Config::from_env();
    let port = config.server_port;
    let state = Arc::new(AppState::load(config)?);

    let app = api::routes()
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
