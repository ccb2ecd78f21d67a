//! Narrows the station index to candidates plausibly on the route.

use crate::models::CandidateStop;
use crate::regions;
use crate::route::RoutePath;
use crate::spatial::haversine_miles;
use crate::stations::StationIndex;

/// Two-stage corridor filter: a cheap state-box pass over the index,
/// then per-station projection onto the route polyline.
#[derive(Debug, Clone, Copy)]
pub struct CorridorFilter {
    /// Stations farther than this from their nearest route point are not
    /// actually on this route (service roads sit within a few miles of
    /// the highway; city-centroid station coordinates need more slack).
    pub corridor_radius_miles: f64,
}

impl Default for CorridorFilter {
    fn default() -> Self {
        Self {
            corridor_radius_miles: 20.0,
        }
    }
}

impl CorridorFilter {
    pub fn new(corridor_radius_miles: f64) -> Self {
        Self {
            corridor_radius_miles,
        }
    }

    /// Project every plausible station onto the route and return the
    /// survivors ordered by distance from the route start.
    ///
    /// A station's position along the route is the cumulative distance
    /// of its nearest route point. Ties in position keep the station
    /// table's input order (stable sort), which keeps planning
    /// deterministic.
    pub fn candidates(&self, route: &RoutePath, index: &StationIndex) -> Vec<CandidateStop> {
        let states = regions::states_touching(route);
        let shortlisted = if states.is_empty() {
            index.all().iter().collect()
        } else {
            index.in_states(&states)
        };

        let mut candidates: Vec<CandidateStop> = shortlisted
            .into_iter()
            .filter_map(|station| {
                let mut nearest = f64::INFINITY;
                let mut along = 0.0;
                for point in route.points() {
                    let dist = haversine_miles(point.lat, point.lon, station.lat, station.lon);
                    if dist < nearest {
                        nearest = dist;
                        along = point.cumulative_distance_miles;
                    }
                }
                (nearest <= self.corridor_radius_miles).then(|| CandidateStop {
                    station: station.clone(),
                    distance_from_start_miles: along,
                    distance_to_route_miles: nearest,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_from_start_miles
                .total_cmp(&b.distance_from_start_miles)
        });
        candidates
    }
}
