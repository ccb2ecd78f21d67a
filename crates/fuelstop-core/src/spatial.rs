//! Great-circle distance math for route and station geometry.

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Calculate the great-circle distance between two points in miles
/// using the Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in miles
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Linear interpolation between two coordinates.
///
/// Adequate for the short segments of a driving polyline; no geodesic
/// correction is applied.
pub fn interpolate(start: (f64, f64), end: (f64, f64), ratio: f64) -> (f64, f64) {
    let t = ratio.clamp(0.0, 1.0);
    (
        start.0 + (end.0 - start.0) * t,
        start.1 + (end.1 - start.1) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_one_degree_latitude() {
        // One degree of latitude is ~69 miles.
        let dist = haversine_miles(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 69.1).abs() < 0.2, "got {dist}");
    }

    #[test]
    fn haversine_same_point_is_zero() {
        let dist = haversine_miles(34.0522, -118.2437, 34.0522, -118.2437);
        assert!(dist < 1e-9);
    }

    #[test]
    fn haversine_known_city_pair() {
        // LA to NYC is roughly 2,450 miles great-circle.
        let dist = haversine_miles(34.0522, -118.2437, 40.7128, -74.0060);
        assert!((dist - 2450.0).abs() < 20.0, "got {dist}");
    }

    #[test]
    fn interpolate_clamps_ratio() {
        let p = interpolate((0.0, 0.0), (10.0, 10.0), 1.5);
        assert_eq!(p, (10.0, 10.0));
        let p = interpolate((0.0, 0.0), (10.0, 10.0), -0.5);
        assert_eq!(p, (0.0, 0.0));
    }
}
