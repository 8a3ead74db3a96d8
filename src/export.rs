//! GPX serialization of the current sequence.
//!
//! Distance-based sequences are written as a route, time-based ones as a
//! single-segment track with a timestamp on every point. Apart from the
//! export time in the metadata the output depends only on the sequence.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use geo::point;
use gpx::{write, Gpx, GpxVersion, Metadata, Route, Track as GpxTrack, TrackSegment, Waypoint};
use time::OffsetDateTime;

use crate::config::ExportConfig;
use crate::error::{EditorError, Result};
use crate::track::{SequenceKind, Track, TrackPoint};

fn gpx_time(time: DateTime<Utc>) -> Result<gpx::Time> {
    let nanos = i128::from(time.timestamp()) * 1_000_000_000
        + i128::from(time.timestamp_subsec_nanos());
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map(gpx::Time::from)
        .map_err(|e| EditorError::Timestamp(e.to_string()))
}

fn waypoint_of(point: &TrackPoint, with_time: bool) -> Result<Waypoint> {
    let mut waypoint = Waypoint::new(point!(x: point.lon, y: point.lat));
    waypoint.elevation = point.elevation;
    if with_time {
        waypoint.time = point.time.map(gpx_time).transpose()?;
    }
    Ok(waypoint)
}

/// Builds the document for `track`.
pub fn to_gpx(track: &Track, config: &ExportConfig, exported_at: DateTime<Utc>) -> Result<Gpx> {
    let metadata = Metadata {
        name: Some(config.creator.clone()),
        time: Some(gpx_time(exported_at)?),
        ..Default::default()
    };

    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(config.creator.clone()),
        metadata: Some(metadata),
        ..Default::default()
    };

    match track.kind() {
        SequenceKind::DistanceBased => {
            let mut route = Route::default();
            for point in track.points() {
                route.points.push(waypoint_of(point, false)?);
            }
            gpx.routes.push(route);
        }
        SequenceKind::TimeBased => {
            let mut segment = TrackSegment::default();
            for point in track.points() {
                segment.points.push(waypoint_of(point, true)?);
            }
            let mut gpx_track = GpxTrack::default();
            gpx_track.segments.push(segment);
            gpx.tracks.push(gpx_track);
        }
    }

    Ok(gpx)
}

pub fn write_track<W: Write>(
    track: &Track,
    config: &ExportConfig,
    exported_at: DateTime<Utc>,
    writer: W,
) -> Result<()> {
    let gpx = to_gpx(track, config, exported_at)?;
    write(&gpx, writer)?;
    Ok(())
}

pub fn to_gpx_string(
    track: &Track,
    config: &ExportConfig,
    exported_at: DateTime<Utc>,
) -> Result<String> {
    let mut buffer = Vec::new();
    write_track(track, config, exported_at, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| EditorError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Default download name: the source file stem plus the configured suffix.
pub fn export_filename(source_name: Option<&str>, suffix: &str) -> String {
    let stem = source_name
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("track");
    format!("{}{}.gpx", stem, suffix)
}
