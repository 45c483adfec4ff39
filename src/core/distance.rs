use crate::models::GeoPoint;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// Coordinates are not range-checked. The `asin` argument is clamped to
/// [-1, 1] so floating-point overshoot never yields NaN.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.max(0.0).sqrt().clamp(-1.0, 1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Distance between two optional points, `None` when either is unknown
#[inline]
pub fn distance_between(from: Option<GeoPoint>, to: Option<GeoPoint>) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) => Some(haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)),
        _ => None,
    }
}
