//! Great-circle distance along a track.

use geo::Point;

/// Mean Earth radius in meters. All internal distances are meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two `(x: lon, y: lat)` points.
pub fn haversine_distance(a: &Point<f64>, b: &Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lon = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push h slightly outside [0, 1] near antipodes
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Running distance in meters; `[0]` is always 0.
pub fn cumulative_distance(points: &[Point<f64>]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(points.len());
    if points.is_empty() {
        return distances;
    }

    distances.push(0.0);
    for i in 1..points.len() {
        let step = haversine_distance(&points[i - 1], &points[i]);
        distances.push(distances[i - 1] + step);
    }
    distances
}

/// Sum of consecutive segment lengths in meters; 0 for fewer than two points.
pub fn path_length(points: &[Point<f64>]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}
