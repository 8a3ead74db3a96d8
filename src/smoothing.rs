//! Windowed-median smoothing.
//!
//! Distance-based sequences get their elevation replaced by the median of a
//! distance window. Time-based sequences keep their elevation and get a speed
//! derived as the median of consecutive-pair speeds inside a time window.
//! Windows are closed intervals centered on each point.

use chrono::{DateTime, Utc};

use crate::config::SmoothingConfig;
use crate::distance::{cumulative_distance, haversine_distance};
use crate::track::{Fix, RawTrack, SequenceKind, TimedFix, Track, TrackPoint};

/// Median with the two middle values averaged for even counts.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Indices whose key lies in `[center - half, center + half]`.
///
/// Sorted keys allow a binary search; otherwise every key is tested. Both
/// paths select exactly the same members.
fn window_members(keys: &[f64], center: f64, half: f64, sorted: bool) -> Vec<usize> {
    let lo = center - half;
    let hi = center + half;
    if sorted {
        let start = keys.partition_point(|&k| k < lo);
        let end = keys.partition_point(|&k| k <= hi);
        (start..end).collect()
    } else {
        keys.iter()
            .enumerate()
            .filter(|(_, k)| **k >= lo && **k <= hi)
            .map(|(i, _)| i)
            .collect()
    }
}

fn is_non_decreasing(keys: &[f64]) -> bool {
    keys.windows(2).all(|w| w[0] <= w[1])
}

/// Median elevation over a distance window, for each point.
///
/// Points without elevation stay without elevation and do not contribute to
/// their neighbours' windows.
pub fn smooth_elevation_by_distance(
    elevations: &[Option<f64>],
    distances: &[f64],
    half_window_m: f64,
) -> Vec<Option<f64>> {
    if elevations.len() != distances.len() {
        return elevations.to_vec();
    }
    let sorted = is_non_decreasing(distances);

    let mut smoothed = Vec::with_capacity(elevations.len());
    for (i, elevation) in elevations.iter().enumerate() {
        let Some(own) = *elevation else {
            smoothed.push(None);
            continue;
        };

        let mut window: Vec<f64> = window_members(distances, distances[i], half_window_m, sorted)
            .into_iter()
            .filter_map(|j| elevations[j])
            .collect();

        if window.len() < 2 {
            smoothed.push(Some(own));
        } else {
            smoothed.push(median(&mut window).or(Some(own)));
        }
    }
    smoothed
}

fn seconds_since(origin: DateTime<Utc>, time: DateTime<Utc>) -> f64 {
    let delta = time - origin;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

/// Speed in m/s for each point of a timed sequence.
///
/// A device-supplied speed is kept as is. The first point is otherwise 0;
/// every other point gets the median instantaneous speed of the consecutive
/// pairs inside its time window, pairs with non-positive duration skipped.
pub fn derive_speed_by_time(points: &[TimedFix], half_window_s: f64) -> Vec<f64> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let seconds: Vec<f64> = points.iter().map(|p| seconds_since(first.time, p.time)).collect();
    let sorted = is_non_decreasing(&seconds);

    let mut speeds = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        if let Some(device_speed) = point.device_speed {
            speeds.push(device_speed);
            continue;
        }
        if i == 0 {
            speeds.push(0.0);
            continue;
        }

        let members = window_members(&seconds, seconds[i], half_window_s, sorted);
        if members.len() < 2 {
            speeds.push(0.0);
            continue;
        }

        let mut instantaneous: Vec<f64> = members
            .windows(2)
            .filter_map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let dt = seconds[b] - seconds[a];
                if dt > 0.0 {
                    Some(haversine_distance(&points[a].fix.point(), &points[b].fix.point()) / dt)
                } else {
                    None
                }
            })
            .collect();

        speeds.push(median(&mut instantaneous).unwrap_or(0.0));
    }
    speeds
}

fn smooth_distance_based(fixes: &[Fix], config: &SmoothingConfig) -> Track {
    let coords: Vec<_> = fixes.iter().map(Fix::point).collect();
    let distances = cumulative_distance(&coords);
    let elevations: Vec<Option<f64>> = fixes.iter().map(|f| f.elevation).collect();
    let smoothed =
        smooth_elevation_by_distance(&elevations, &distances, config.elevation_half_window_m());

    let points = fixes
        .iter()
        .zip(smoothed)
        .zip(distances)
        .map(|((fix, elevation), distance_m)| TrackPoint {
            lat: fix.lat,
            lon: fix.lon,
            elevation,
            time: None,
            speed: None,
            distance_m,
        })
        .collect();
    Track::new(SequenceKind::DistanceBased, points)
}

fn smooth_time_based(fixes: &[TimedFix], config: &SmoothingConfig) -> Track {
    let speeds = derive_speed_by_time(fixes, config.speed_half_window_s());

    let points = fixes
        .iter()
        .zip(speeds)
        .map(|(timed, speed)| TrackPoint {
            lat: timed.fix.lat,
            lon: timed.fix.lon,
            elevation: timed.fix.elevation,
            time: Some(timed.time),
            speed: Some(speed),
            distance_m: 0.0,
        })
        .collect();
    Track::new(SequenceKind::TimeBased, points)
}

/// Runs the pass that matches the sequence kind.
pub fn smooth(raw: &RawTrack, config: &SmoothingConfig) -> Track {
    let track = match raw {
        RawTrack::DistanceBased(fixes) => smooth_distance_based(fixes, config),
        RawTrack::TimeBased(fixes) => smooth_time_based(fixes, config),
    };
    tracing::debug!(kind = ?track.kind(), points = track.len(), "Smoothing complete");
    track
}
