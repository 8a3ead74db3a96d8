//! Summary statistics over the current sequence.
//!
//! Distances are accumulated in meters like everywhere else and only
//! converted to kilometers for the reported total.

use geo::Point;
use serde::Serialize;

use crate::distance::path_length;
use crate::track::TrackPoint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrackStatistics {
    pub total_distance_km: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    pub min_elevation_m: f64,
    pub max_elevation_m: f64,
}

/// All-zero for fewer than two points.
///
/// Gain and loss only count steps where both ends have an elevation; points
/// without elevation are left out of the extrema.
pub fn compute_statistics(points: &[TrackPoint]) -> TrackStatistics {
    if points.len() < 2 {
        return TrackStatistics::default();
    }

    let coords: Vec<Point<f64>> = points.iter().map(TrackPoint::point).collect();
    let total_distance_m = path_length(&coords);

    let mut gain = 0.0;
    let mut loss = 0.0;
    let mut min_elevation = f64::INFINITY;
    let mut max_elevation = f64::NEG_INFINITY;

    for ele in points.iter().filter_map(|p| p.elevation) {
        min_elevation = min_elevation.min(ele);
        max_elevation = max_elevation.max(ele);
    }

    for pair in points.windows(2) {
        if let (Some(a), Some(b)) = (pair[0].elevation, pair[1].elevation) {
            let delta = b - a;
            if delta > 0.0 {
                gain += delta;
            } else {
                loss -= delta;
            }
        }
    }

    // no point had an elevation
    if min_elevation > max_elevation {
        min_elevation = 0.0;
        max_elevation = 0.0;
    }

    TrackStatistics {
        total_distance_km: total_distance_m / 1000.0,
        elevation_gain_m: gain,
        elevation_loss_m: loss,
        min_elevation_m: min_elevation,
        max_elevation_m: max_elevation,
    }
}
