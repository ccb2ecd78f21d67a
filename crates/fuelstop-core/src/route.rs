//! Normalized route polyline with per-point cumulative distance.

use crate::error::PlanError;
use crate::models::RoutePoint;
use crate::spatial::{haversine_miles, interpolate};

/// An ordered driving polyline with road distance assigned to every
/// point.
///
/// Invariants: at least 2 points, monotonically non-decreasing
/// cumulative distance, first point at mile 0, last point at
/// `total_distance_miles`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    points: Vec<RoutePoint>,
    total_distance_miles: f64,
    total_duration_hours: f64,
}

impl RoutePath {
    /// Point count above which the polyline is thinned before use.
    pub const DEFAULT_DOWNSAMPLE_THRESHOLD: usize = 500;

    /// Build a route from raw `(lat, lon)` provider geometry.
    ///
    /// Per-point distance is derived by accumulating great-circle
    /// distance between consecutive points, then rescaled so the last
    /// point lands exactly on the provider-reported total. The
    /// provider's road-network total is authoritative; the piecewise
    /// polyline undershoots it.
    pub fn from_points(
        points: &[(f64, f64)],
        total_distance_miles: f64,
        total_duration_hours: f64,
        downsample_threshold: usize,
    ) -> Result<Self, PlanError> {
        validate_raw(points, total_distance_miles, total_duration_hours)?;

        let mut cumulative = Vec::with_capacity(points.len());
        cumulative.push(0.0);
        for window in points.windows(2) {
            let (lat1, lon1) = window[0];
            let (lat2, lon2) = window[1];
            let last = *cumulative.last().unwrap_or(&0.0);
            cumulative.push(last + haversine_miles(lat1, lon1, lat2, lon2));
        }

        let derived_total = *cumulative.last().unwrap_or(&0.0);
        let route_points: Vec<RoutePoint> = if derived_total > 0.0 {
            let scale = total_distance_miles / derived_total;
            points
                .iter()
                .zip(cumulative)
                .map(|(&(lat, lon), dist)| RoutePoint {
                    lat,
                    lon,
                    cumulative_distance_miles: dist * scale,
                })
                .collect()
        } else {
            // Degenerate polyline (all points coincide): spread the
            // provider total uniformly so the invariants still hold.
            let span = (points.len() - 1) as f64;
            points
                .iter()
                .enumerate()
                .map(|(i, &(lat, lon))| RoutePoint {
                    lat,
                    lon,
                    cumulative_distance_miles: total_distance_miles * i as f64 / span,
                })
                .collect()
        };

        Self::finish(route_points, total_duration_hours, downsample_threshold)
    }

    /// Build a route from points that already carry provider-supplied
    /// cumulative distances.
    pub fn with_cumulative_distances(
        points: Vec<RoutePoint>,
        total_duration_hours: f64,
        downsample_threshold: usize,
    ) -> Result<Self, PlanError> {
        if points.len() < 2 {
            return Err(PlanError::InvalidRoute(format!(
                "route needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(first) = points.first() {
            if first.cumulative_distance_miles.abs() > 1e-6 {
                return Err(PlanError::InvalidRoute(
                    "first point must be at mile 0".to_string(),
                ));
            }
        }
        Self::finish(points, total_duration_hours, downsample_threshold)
    }

    fn finish(
        points: Vec<RoutePoint>,
        total_duration_hours: f64,
        downsample_threshold: usize,
    ) -> Result<Self, PlanError> {
        for window in points.windows(2) {
            if window[1].cumulative_distance_miles < window[0].cumulative_distance_miles {
                return Err(PlanError::InvalidRoute(format!(
                    "cumulative distance decreases at mile {:.2}",
                    window[0].cumulative_distance_miles
                )));
            }
        }

        let total_distance_miles = points
            .last()
            .map(|p| p.cumulative_distance_miles)
            .unwrap_or(0.0);

        Ok(Self {
            points: downsample(points, downsample_threshold),
            total_distance_miles,
            total_duration_hours,
        })
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn total_distance_miles(&self) -> f64 {
        self.total_distance_miles
    }

    pub fn total_duration_hours(&self) -> f64 {
        self.total_duration_hours
    }

    pub fn start(&self) -> (f64, f64) {
        let p = &self.points[0];
        (p.lat, p.lon)
    }

    pub fn end(&self) -> (f64, f64) {
        let p = &self.points[self.points.len() - 1];
        (p.lat, p.lon)
    }

    /// Coordinates at the given distance from the start, clamped to the
    /// route endpoints.
    pub fn point_at(&self, distance_miles: f64) -> (f64, f64) {
        if distance_miles <= 0.0 {
            return self.start();
        }
        for window in self.points.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            if distance_miles <= b.cumulative_distance_miles {
                let span = b.cumulative_distance_miles - a.cumulative_distance_miles;
                if span <= 0.0 {
                    return (a.lat, a.lon);
                }
                let ratio = (distance_miles - a.cumulative_distance_miles) / span;
                return interpolate((a.lat, a.lon), (b.lat, b.lon), ratio);
            }
        }
        self.end()
    }
}

fn validate_raw(
    points: &[(f64, f64)],
    total_distance_miles: f64,
    total_duration_hours: f64,
) -> Result<(), PlanError> {
    if points.len() < 2 {
        return Err(PlanError::InvalidRoute(format!(
            "route needs at least 2 points, got {}",
            points.len()
        )));
    }
    if !total_distance_miles.is_finite() || total_distance_miles < 0.0 {
        return Err(PlanError::InvalidRoute(
            "total distance must be finite and non-negative".to_string(),
        ));
    }
    if !total_duration_hours.is_finite() || total_duration_hours < 0.0 {
        return Err(PlanError::InvalidRoute(
            "total duration must be finite and non-negative".to_string(),
        ));
    }
    for &(lat, lon) in points {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(PlanError::InvalidRoute(format!(
                "coordinate out of range: ({lat}, {lon})"
            )));
        }
    }
    Ok(())
}

/// Keep every Nth point so the count stays at or below `threshold`,
/// always retaining the first and last point exactly.
///
/// Station projection cost scales with point count; over-dense
/// interstate polylines add no useful fidelity. Cumulative distances are
/// assigned before thinning, so kept points keep their true positions
/// and the route totals are untouched.
fn downsample(points: Vec<RoutePoint>, threshold: usize) -> Vec<RoutePoint> {
    let n = points.len();
    if threshold < 2 || n <= threshold {
        return points;
    }

    let stride = (n - 1).div_ceil(threshold - 1);
    let last = n - 1;
    points
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % stride == 0 || *i == last)
        .map(|(_, p)| p)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_line(n: usize) -> Vec<(f64, f64)> {
        // Eastward along the 40th parallel.
        (0..n)
            .map(|i| (40.0, -100.0 + i as f64 * 0.01))
            .collect()
    }

    #[test]
    fn rejects_short_routes() {
        let err = RoutePath::from_points(&[(40.0, -100.0)], 10.0, 0.2, 500).unwrap_err();
        assert!(matches!(err, PlanError::InvalidRoute(_)));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let err =
            RoutePath::from_points(&[(40.0, -100.0), (f64::NAN, -99.0)], 10.0, 0.2, 500)
                .unwrap_err();
        assert!(matches!(err, PlanError::InvalidRoute(_)));
    }

    #[test]
    fn rejects_decreasing_cumulative_distance() {
        let points = vec![
            RoutePoint { lat: 40.0, lon: -100.0, cumulative_distance_miles: 0.0 },
            RoutePoint { lat: 40.0, lon: -99.0, cumulative_distance_miles: 50.0 },
            RoutePoint { lat: 40.0, lon: -98.0, cumulative_distance_miles: 40.0 },
        ];
        let err = RoutePath::with_cumulative_distances(points, 1.0, 500).unwrap_err();
        assert!(matches!(err, PlanError::InvalidRoute(_)));
    }

    #[test]
    fn rescales_to_provider_total() {
        // Great-circle sum understates road distance; the provider total
        // must win.
        let route = RoutePath::from_points(&straight_line(100), 120.0, 2.0, 500).unwrap();
        assert!((route.total_distance_miles() - 120.0).abs() < 1e-9);
        let last = route.points().last().unwrap();
        assert!((last.cumulative_distance_miles - 120.0).abs() < 1e-9);
        assert!((route.points()[0].cumulative_distance_miles).abs() < 1e-9);
    }

    #[test]
    fn cumulative_distance_is_monotonic() {
        let route = RoutePath::from_points(&straight_line(300), 250.0, 4.0, 500).unwrap();
        for window in route.points().windows(2) {
            assert!(
                window[1].cumulative_distance_miles >= window[0].cumulative_distance_miles
            );
        }
    }

    #[test]
    fn downsampling_bounds_point_count_and_keeps_endpoints() {
        let raw = straight_line(4321);
        let route = RoutePath::from_points(&raw, 500.0, 8.0, 500).unwrap();
        assert!(route.points().len() <= 500, "got {}", route.points().len());
        assert_eq!(route.start(), (raw[0].0, raw[0].1));
        assert_eq!(route.end(), (raw[4320].0, raw[4320].1));
    }

    #[test]
    fn downsampling_never_changes_totals() {
        let raw = straight_line(2000);
        let dense = RoutePath::from_points(&raw, 333.0, 5.5, 10_000).unwrap();
        let sparse = RoutePath::from_points(&raw, 333.0, 5.5, 100).unwrap();
        assert_eq!(dense.total_distance_miles(), sparse.total_distance_miles());
        assert_eq!(dense.total_duration_hours(), sparse.total_duration_hours());
        assert!(sparse.points().len() <= 100);
        assert!(dense.points().len() == 2000);
    }

    #[test]
    fn degenerate_polyline_spreads_total_uniformly() {
        let raw = vec![(40.0, -100.0); 5];
        let route = RoutePath::from_points(&raw, 100.0, 2.0, 500).unwrap();
        assert!((route.total_distance_miles() - 100.0).abs() < 1e-9);
        assert!((route.points()[2].cumulative_distance_miles - 50.0).abs() < 1e-9);
    }

    #[test]
    fn point_at_interpolates_and_clamps() {
        let points = vec![
            RoutePoint { lat: 40.0, lon: -100.0, cumulative_distance_miles: 0.0 },
            RoutePoint { lat: 40.0, lon: -99.0, cumulative_distance_miles: 100.0 },
        ];
        let route = RoutePath::with_cumulative_distances(points, 2.0, 500).unwrap();
        let (lat, lon) = route.point_at(50.0);
        assert!((lat - 40.0).abs() < 1e-9);
        assert!((lon - (-99.5)).abs() < 1e-9);
        assert_eq!(route.point_at(-5.0), route.start());
        assert_eq!(route.point_at(500.0), route.end());
    }
}
