//! REST API routes.

use axum::{
    extract::{Query, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::map;
use crate::error::ApiError;
use crate::state::AppState;
use fuelstop_core::{plan_route, FuelPlan, FuelStation, FuelStop, RoutePath};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/v1/routes/plan", post(plan_route_handler))
        .route("/v1/routes/map", get(map_handler))
        .route("/v1/stations", get(list_stations))
        .route("/v1/stations/cheapest", get(cheapest_stations))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    /// Trip origin, `"City, ST"` or a free-text US address.
    pub start: String,
    /// Trip destination, same format as `start`.
    pub finish: String,
    pub max_range_miles: Option<f64>,
    pub mpg: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub start_location: String,
    pub end_location: String,
    /// Route endpoint coordinates `[lat, lon]`, snapped to the road
    /// network by the routing provider.
    pub start_coords: [f64; 2],
    pub end_coords: [f64; 2],
    pub max_range_miles: f64,
    pub mpg: f64,
    pub total_distance_miles: f64,
    pub total_duration_hours: f64,
    pub fuel_stops: Vec<FuelStop>,
    pub total_gallons: f64,
    pub total_fuel_cost: Option<f64>,
    pub average_price_per_gallon: Option<f64>,
    /// Relative URL of the interactive map for the same trip.
    pub map_url: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StationsQuery {
    /// Two-letter state code filter.
    pub state: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CheapestQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    pub start: String,
    pub finish: String,
    pub max_range_miles: Option<f64>,
    pub mpg: Option<f64>,
}

/// Validated vehicle parameters with config defaults applied.
#[derive(Debug, Clone, Copy)]
pub(super) struct VehicleParams {
    pub max_range_miles: f64,
    pub mpg: f64,
}

impl VehicleParams {
    fn resolve(
        state: &AppState,
        max_range_miles: Option<f64>,
        mpg: Option<f64>,
    ) -> Result<Self, ApiError> {
        let max_range_miles = max_range_miles.unwrap_or(state.config().default_max_range_miles);
        let mpg = mpg.unwrap_or(state.config().default_mpg);
        if !max_range_miles.is_finite() || max_range_miles <= 0.0 {
            return Err(ApiError::bad_request(
                "max_range_miles must be a positive number",
                Some("max_range_miles"),
            ));
        }
        if !mpg.is_finite() || mpg <= 0.0 {
            return Err(ApiError::bad_request(
                "mpg must be a positive number",
                Some("mpg"),
            ));
        }
        Ok(Self {
            max_range_miles,
            mpg,
        })
    }
}

/// Full planning pipeline shared by the JSON and map endpoints:
/// geocode both endpoints, fetch route geometry, filter the corridor,
/// and run the planner.
pub(super) async fn run_plan(
    state: &AppState,
    start: &str,
    finish: &str,
    params: VehicleParams,
) -> Result<(RoutePath, FuelPlan), ApiError> {
    let start_coords = state.geocoder().resolve(start).await?;
    let finish_coords = state.geocoder().resolve(finish).await?;

    let raw = state.routing().fetch_route(start_coords, finish_coords).await?;
    let route = RoutePath::from_points(
        &raw.points,
        raw.distance_miles,
        raw.duration_hours,
        state.config().downsample_threshold,
    )?;

    let candidates = state.corridor().candidates(&route, state.index());
    tracing::debug!(
        total_distance_miles = route.total_distance_miles(),
        candidates = candidates.len(),
        "planning trip"
    );

    let plan = plan_route(&route, &candidates, params.max_range_miles, params.mpg)?;
    Ok((route, plan))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent-encode a query value. Only the characters that break query
/// parsing need escaping here; everything else passes through.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '+' => out.push_str("%2B"),
            '#' => out.push_str("%23"),
            '=' => out.push_str("%3D"),
            '?' => out.push_str("%3F"),
            _ => out.push(ch),
        }
    }
    out
}

fn map_url(start: &str, finish: &str, params: VehicleParams) -> String {
    format!(
        "/v1/routes/map?start={}&finish={}&max_range_miles={}&mpg={}",
        encode_query_value(start),
        encode_query_value(finish),
        params.max_range_miles,
        params.mpg,
    )
}

// === Handlers ===

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "fuelstop-server",
        "endpoints": [
            "GET /health",
            "POST /v1/routes/plan",
            "GET /v1/routes/map?start=&finish=",
            "GET /v1/stations?state=&limit=",
            "GET /v1/stations/cheapest?limit="
        ]
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "stations": state.index().len(),
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn plan_route_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let params = VehicleParams::resolve(&state, req.max_range_miles, req.mpg)?;
    let (route, plan) = run_plan(&state, &req.start, &req.finish, params).await?;

    tracing::info!(
        start = %req.start,
        finish = %req.finish,
        stops = plan.fuel_stops.len(),
        total_distance_miles = round2(route.total_distance_miles()),
        "planned trip"
    );

    let (start_lat, start_lon) = route.start();
    let (end_lat, end_lon) = route.end();
    Ok(Json(PlanResponse {
        map_url: map_url(&req.start, &req.finish, params),
        start_location: req.start,
        end_location: req.finish,
        start_coords: [start_lat, start_lon],
        end_coords: [end_lat, end_lon],
        max_range_miles: params.max_range_miles,
        mpg: params.mpg,
        total_distance_miles: round2(plan.total_distance_miles),
        total_duration_hours: round2(plan.total_duration_hours),
        fuel_stops: plan.fuel_stops,
        total_gallons: round2(plan.total_gallons),
        total_fuel_cost: plan.total_fuel_cost.map(round2),
        average_price_per_gallon: plan.average_price_per_gallon.map(round2),
        generated_at: chrono::Utc::now(),
    }))
}

async fn map_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> Result<Html<String>, ApiError> {
    let params = VehicleParams::resolve(&state, query.max_range_miles, query.mpg)?;
    let (route, plan) = run_plan(&state, &query.start, &query.finish, params).await?;
    Ok(Html(map::render(
        &query.start,
        &query.finish,
        &route,
        &plan,
    )))
}

async fn list_stations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StationsQuery>,
) -> Result<Json<Vec<FuelStation>>, ApiError> {
    let limit = query.limit.unwrap_or(100);
    if limit == 0 {
        return Err(ApiError::bad_request(
            "limit must be at least 1",
            Some("limit"),
        ));
    }

    let stations: Vec<FuelStation> = match query.state.as_deref() {
        Some(code) => {
            let code = code.trim().to_uppercase();
            if !fuelstop_core::regions::is_us_state(&code) {
                return Err(ApiError::bad_request(
                    format!("unknown state code: {code}"),
                    Some("state"),
                ));
            }
            state
                .index()
                .in_state(&code)
                .into_iter()
                .take(limit)
                .cloned()
                .collect()
        }
        None => state.index().all().iter().take(limit).cloned().collect(),
    };
    Ok(Json(stations))
}

async fn cheapest_stations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheapestQuery>,
) -> Result<Json<Vec<FuelStation>>, ApiError> {
    let limit = query.limit.unwrap_or(10);
    if limit == 0 {
        return Err(ApiError::bad_request(
            "limit must be at least 1",
            Some("limit"),
        ));
    }
    let stations = state
        .index()
        .cheapest(limit)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(stations))
}
