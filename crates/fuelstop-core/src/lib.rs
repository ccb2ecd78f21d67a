pub mod corridor;
pub mod error;
pub mod models;
pub mod planner;
pub mod regions;
pub mod route;
pub mod spatial;
pub mod stations;

pub use corridor::CorridorFilter;
pub use error::PlanError;
pub use models::{CandidateStop, FuelPlan, FuelStation, FuelStop, RoutePoint};
pub use planner::plan_route;
pub use route::RoutePath;
pub use spatial::haversine_miles;
pub use stations::StationIndex;
