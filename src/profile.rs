//! Per-point profile table: the distance, elevation and speed series shown by
//! the chart views, written as CSV.

use std::io::Write;

use csv::Writer;
use serde::Serialize;

use crate::error::Result;
use crate::track::Track;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRow {
    pub index: usize,
    pub distance_km: f64,
    pub elevation_m: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub time: Option<String>,
}

pub fn profile_rows(track: &Track) -> Vec<ProfileRow> {
    track
        .points()
        .iter()
        .enumerate()
        .map(|(index, p)| ProfileRow {
            index,
            distance_km: p.distance_m / 1000.0,
            elevation_m: p.elevation,
            speed_kmh: p.speed.map(|mps| mps * 3.6),
            time: p.time.map(|t| t.to_rfc3339()),
        })
        .collect()
}

pub fn write_profile_csv<W: Write>(track: &Track, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for row in profile_rows(track) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
