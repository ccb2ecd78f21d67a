//! HTTP API for the fuel-stop planner.

mod map;
mod routes;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}
