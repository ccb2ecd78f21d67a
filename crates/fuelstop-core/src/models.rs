//! Core data models for fuel-stop planning.

use serde::{Deserialize, Serialize};

/// A point on a driving route with its position along the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
    /// Road distance from the route start, in miles.
    pub cumulative_distance_miles: f64,
}

/// A fuel station from the reference price table.
///
/// Loaded once at process start and shared read-only across requests;
/// nothing mutates a station after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStation {
    pub id: u64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub price_per_gallon: f64,
}

/// A station projected onto a specific route for one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateStop {
    pub station: FuelStation,
    /// Position of the nearest route point, treated as the station's
    /// position along the route.
    pub distance_from_start_miles: f64,
    /// Great-circle distance from the station to its nearest route point.
    pub distance_to_route_miles: f64,
}

impl CandidateStop {
    /// Whether this stop lies in the reachable window
    /// `(position, position + remaining_range]`.
    pub fn is_reachable(&self, position_miles: f64, remaining_range_miles: f64) -> bool {
        self.distance_from_start_miles > position_miles
            && self.distance_from_start_miles <= position_miles + remaining_range_miles
    }
}

/// One selected refueling stop in a finished plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStop {
    pub id: u64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub price_per_gallon: f64,
    pub distance_from_start_miles: f64,
}

impl FuelStop {
    pub(crate) fn from_candidate(candidate: &CandidateStop) -> Self {
        Self {
            id: candidate.station.id,
            name: candidate.station.name.clone(),
            city: candidate.station.city.clone(),
            state: candidate.station.state.clone(),
            lat: candidate.station.lat,
            lon: candidate.station.lon,
            price_per_gallon: candidate.station.price_per_gallon,
            distance_from_start_miles: candidate.distance_from_start_miles,
        }
    }
}

/// The output of a planning run. Built once per request, immutable after
/// construction.
///
/// `total_fuel_cost` and `average_price_per_gallon` are `None` when the
/// trip fits on the starting tank: no station was consulted, so no price
/// is known. Callers must treat `null` as "unavailable", not as free
/// fuel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPlan {
    pub total_distance_miles: f64,
    pub total_duration_hours: f64,
    pub fuel_stops: Vec<FuelStop>,
    pub total_gallons: f64,
    pub total_fuel_cost: Option<f64>,
    pub average_price_per_gallon: Option<f64>,
}
