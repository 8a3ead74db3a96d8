//! Maps a parsed GPX document onto the canonical point representation.
//!
//! Only the first point group is consumed: the first track if the document
//! has one, otherwise the first route. A track counts as time-based only when
//! every one of its points carries a timestamp.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use gpx::{read, Gpx, Waypoint};

use crate::error::Result;
use crate::track::{Fix, RawTrack, TimedFix};

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Loaded(RawTrack),
    /// Neither a track nor a route with points was found
    NoData,
}

pub fn read_gpx<R: Read>(reader: R) -> Result<Gpx> {
    Ok(read(BufReader::new(reader))?)
}

pub fn read_gpx_file(path: &Path) -> Result<Gpx> {
    let file = File::open(path)?;
    read_gpx(file)
}

/// Parses and normalizes a GPX document in one step.
pub fn ingest_reader<R: Read>(reader: R) -> Result<IngestOutcome> {
    let gpx = read_gpx(reader)?;
    Ok(normalize(&gpx))
}

pub fn normalize(gpx: &Gpx) -> IngestOutcome {
    if let Some(track) = gpx.tracks.first() {
        let waypoints: Vec<&Waypoint> = track
            .segments
            .iter()
            .flat_map(|segment| segment.points.iter())
            .collect();
        if !waypoints.is_empty() {
            return IngestOutcome::Loaded(classify_track_points(&waypoints));
        }
    }

    if let Some(route) = gpx.routes.first() {
        if !route.points.is_empty() {
            let fixes: Vec<Fix> = route.points.iter().map(fix_of).collect();
            tracing::debug!(points = fixes.len(), "Ingested route");
            return IngestOutcome::Loaded(RawTrack::DistanceBased(fixes));
        }
    }

    tracing::warn!("GPX document has no track or route points");
    IngestOutcome::NoData
}

fn classify_track_points(waypoints: &[&Waypoint]) -> RawTrack {
    let timed: Option<Vec<TimedFix>> = waypoints
        .iter()
        .map(|wpt| {
            timestamp_of(wpt).map(|time| TimedFix {
                fix: fix_of(wpt),
                time,
                device_speed: wpt.speed,
            })
        })
        .collect();

    match timed {
        Some(points) => {
            tracing::debug!(points = points.len(), "Ingested time-based track");
            RawTrack::TimeBased(points)
        }
        None => {
            tracing::info!(
                points = waypoints.len(),
                "Track has points without timestamps, treating it as distance-based"
            );
            RawTrack::DistanceBased(waypoints.iter().map(|wpt| fix_of(wpt)).collect())
        }
    }
}

fn fix_of(wpt: &Waypoint) -> Fix {
    let p = wpt.point();
    Fix::new(p.y(), p.x(), wpt.elevation)
}

fn timestamp_of(wpt: &Waypoint) -> Option<DateTime<Utc>> {
    let iso = wpt.time.as_ref()?.format().ok()?;
    DateTime::parse_from_rfc3339(&iso)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
