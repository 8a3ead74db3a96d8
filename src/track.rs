//! Point and sequence types.
//!
//! Ingest produces a [`RawTrack`] whose variant fixes the sequence kind; the
//! smoothing pass turns it into a [`Track`] of [`TrackPoint`]s that carry the
//! same kind. A `Track` is never mutated in place: edits build a new one.

use chrono::{DateTime, Utc};
use geo::{point, BoundingRect, LineString, Point, Rect};
use serde::Serialize;

use crate::distance::cumulative_distance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequenceKind {
    /// Track with timestamps; speed is meaningful
    TimeBased,
    /// Route without timestamps; positioned by cumulative distance
    DistanceBased,
}

/// Position and elevation shared by both point kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
}

impl Fix {
    pub fn new(lat: f64, lon: f64, elevation: Option<f64>) -> Self {
        Fix { lat, lon, elevation }
    }

    pub fn point(&self) -> Point<f64> {
        point!(x: self.lon, y: self.lat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedFix {
    pub fix: Fix,
    pub time: DateTime<Utc>,
    /// Speed reported by the recording device, m/s
    pub device_speed: Option<f64>,
}

/// Normalized ingest output, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTrack {
    TimeBased(Vec<TimedFix>),
    DistanceBased(Vec<Fix>),
}

impl RawTrack {
    pub fn kind(&self) -> SequenceKind {
        match self {
            RawTrack::TimeBased(_) => SequenceKind::TimeBased,
            RawTrack::DistanceBased(_) => SequenceKind::DistanceBased,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawTrack::TimeBased(points) => points.len(),
            RawTrack::DistanceBased(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Smoothed, analyzable point.
///
/// For time-based sequences `time` and `speed` are always set; for
/// distance-based ones both are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    /// m/s
    pub speed: Option<f64>,
    /// Meters from the first point of the sequence
    pub distance_m: f64,
}

impl TrackPoint {
    pub fn point(&self) -> Point<f64> {
        point!(x: self.lon, y: self.lat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    kind: SequenceKind,
    points: Vec<TrackPoint>,
}

impl Track {
    /// Builds a sequence and recomputes cumulative distance from index 0.
    pub fn new(kind: SequenceKind, mut points: Vec<TrackPoint>) -> Self {
        let coords: Vec<Point<f64>> = points.iter().map(TrackPoint::point).collect();
        for (point, distance) in points.iter_mut().zip(cumulative_distance(&coords)) {
            point.distance_m = distance;
        }
        Track { kind, points }
    }

    pub fn empty(kind: SequenceKind) -> Self {
        Track { kind, points: Vec::new() }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackPoint> {
        self.points.get(index)
    }

    /// Lat/lon extent for fitting a map view.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let line: LineString<f64> = self.points.iter().map(|p| (p.lon, p.lat)).collect();
        line.bounding_rect()
    }
}
