//! Planning errors. All of these are terminal for a request: retrying an
//! algorithmic infeasibility cannot change the outcome.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Route geometry was malformed (too few points, non-finite
    /// coordinates, or non-monotonic cumulative distance).
    #[error("invalid route geometry: {0}")]
    InvalidRoute(String),

    /// The corridor filter produced no stations at all, but the trip
    /// needs at least one stop.
    #[error("no fuel stations found anywhere along the route corridor")]
    NoCandidates,

    /// Stations exist along the corridor, but the gap ahead of the
    /// current position exceeds the vehicle's range.
    #[error(
        "no fuel stations found within range between mile {position_miles:.0} and mile {max_reach_miles:.0}"
    )]
    UnreachableDestination {
        /// Position along the route when the planner ran out of options.
        position_miles: f64,
        /// Farthest point reachable on the current tank.
        max_reach_miles: f64,
        /// Next candidate past the reachable window, if any.
        next_candidate_miles: Option<f64>,
    },
}
