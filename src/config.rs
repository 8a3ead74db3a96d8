//! Editor tunables.
//!
//! Defaults carry the fixed windows used by the smoothing passes; a JSON file
//! may override any subset of them.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Full width of the distance window used for the elevation median
pub const ELEVATION_WINDOW_M: f64 = 25.0;
/// Full width of the time window used for the speed median
pub const SPEED_WINDOW_S: f64 = 15.0;

pub const DEFAULT_CREATOR: &str = "gpx-track-editor";
pub const DEFAULT_FILENAME_SUFFIX: &str = "_edited";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub elevation_window_m: f64,
    pub speed_window_s: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingConfig {
            elevation_window_m: ELEVATION_WINDOW_M,
            speed_window_s: SPEED_WINDOW_S,
        }
    }
}

impl SmoothingConfig {
    pub fn elevation_half_window_m(&self) -> f64 {
        self.elevation_window_m / 2.0
    }

    pub fn speed_half_window_s(&self) -> f64 {
        self.speed_window_s / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Written to the `creator` attribute and the metadata name
    pub creator: String,
    /// Appended to the source file stem when seeding the export filename
    pub filename_suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            creator: DEFAULT_CREATOR.to_string(),
            filename_suffix: DEFAULT_FILENAME_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub smoothing: SmoothingConfig,
    pub export: ExportConfig,
}

impl EditorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let config = EditorConfig::default();
        assert_eq!(config.smoothing.elevation_half_window_m(), 12.5);
        assert_eq!(config.smoothing.speed_half_window_s(), 7.5);
        assert_eq!(config.export.filename_suffix, "_edited");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config =
            EditorConfig::from_json_str(r#"{"smoothing": {"speed_window_s": 30.0}}"#).unwrap();
        assert_eq!(config.smoothing.speed_window_s, 30.0);
        assert_eq!(config.smoothing.elevation_window_m, ELEVATION_WINDOW_M);
        assert_eq!(config.export.creator, DEFAULT_CREATOR);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(EditorConfig::from_json_str("{ not json").is_err());
    }
}
