//! Edit session over a single sequence.
//!
//! The session owns the current [`Track`], the timeline [`SelectionState`] and
//! the "edited" flag. Crop and delete build a new track and swap it in whole;
//! selection and active index are cleared with every swap, so an index from
//! an older sequence is never read against a newer one.

use std::io::Write;

use chrono::{DateTime, Utc};
use geo::Rect;

use crate::config::EditorConfig;
use crate::error::{EditorError, ExportBlocker, Result};
use crate::export::{export_filename, to_gpx_string, write_track};
use crate::ingest::IngestOutcome;
use crate::selection::{PointerEvent, SelectionRange, SelectionState, TimelineBounds};
use crate::smoothing::smooth;
use crate::stats::{compute_statistics, TrackStatistics};
use crate::track::{SequenceKind, Track, TrackPoint};

/// New sequence holding the closed range `[start, end]`.
pub fn crop(track: &Track, range: SelectionRange) -> Track {
    let points = track.points();
    let end = range.end().min(points.len().saturating_sub(1));
    let kept = points
        .get(range.start()..=end)
        .map(|slice| slice.to_vec())
        .unwrap_or_default();
    Track::new(track.kind(), kept)
}

/// New sequence without the closed range `[start, end]`.
pub fn delete(track: &Track, range: SelectionRange) -> Track {
    let kept: Vec<TrackPoint> = track
        .points()
        .iter()
        .enumerate()
        .filter(|(i, _)| !range.contains(*i))
        .map(|(_, p)| p.clone())
        .collect();
    Track::new(track.kind(), kept)
}

/// Identifies one ingest request; only the newest one is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded { kind: SequenceKind, points: usize },
    NoData,
    /// A newer ingest was started before this one completed
    Superseded,
}

#[derive(Debug, Clone)]
pub struct TrackEditor {
    config: EditorConfig,
    track: Track,
    selection: SelectionState,
    edited: bool,
    source_name: Option<String>,
    generation: u64,
}

impl Default for TrackEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl TrackEditor {
    pub fn new(config: EditorConfig) -> Self {
        TrackEditor {
            config,
            track: Track::empty(SequenceKind::DistanceBased),
            selection: SelectionState::new(),
            edited: false,
            source_name: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn active_point(&self) -> Option<&TrackPoint> {
        self.selection.active_index().and_then(|i| self.track.get(i))
    }

    pub fn statistics(&self) -> TrackStatistics {
        compute_statistics(self.track.points())
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.track.bounds()
    }

    /// Starts an ingest. Any ingest still in flight becomes stale.
    pub fn begin_ingest(&mut self) -> IngestTicket {
        self.generation += 1;
        IngestTicket(self.generation)
    }

    /// Applies a finished ingest if `ticket` is still the newest.
    pub fn complete_ingest(
        &mut self,
        ticket: IngestTicket,
        outcome: IngestOutcome,
        source_name: Option<&str>,
    ) -> LoadStatus {
        if ticket.0 != self.generation {
            tracing::warn!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding stale ingest result"
            );
            return LoadStatus::Superseded;
        }

        match outcome {
            IngestOutcome::Loaded(raw) => {
                let track = smooth(&raw, &self.config.smoothing);
                let status = LoadStatus::Loaded { kind: track.kind(), points: track.len() };
                self.replace_track(track);
                self.edited = false;
                self.source_name = source_name.map(str::to_string);
                tracing::info!(
                    kind = ?self.track.kind(),
                    points = self.track.len(),
                    "Loaded sequence"
                );
                status
            }
            IngestOutcome::NoData => {
                self.clear();
                tracing::warn!(
                    source = source_name.unwrap_or("<unnamed>"),
                    "No track or route data"
                );
                LoadStatus::NoData
            }
        }
    }

    /// Synchronous ingest: begin and complete in one call.
    pub fn load(&mut self, outcome: IngestOutcome, source_name: Option<&str>) -> LoadStatus {
        let ticket = self.begin_ingest();
        self.complete_ingest(ticket, outcome, source_name)
    }

    /// Drops the sequence and every piece of interaction state.
    pub fn reset(&mut self) {
        self.clear();
        tracing::debug!("Editor reset");
    }

    fn clear(&mut self) {
        self.replace_track(Track::empty(self.track.kind()));
        self.edited = false;
        self.source_name = None;
    }

    fn replace_track(&mut self, track: Track) {
        self.track = track;
        self.selection = SelectionState::new();
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, bounds: &TimelineBounds) {
        self.selection = self.selection.apply(event, self.track.len(), bounds);
    }

    /// Active point chosen from another view, e.g. the elevation chart.
    pub fn select_point(&mut self, index: usize) {
        self.selection = self.selection.select_point(index, self.track.len());
    }

    /// Keeps only the selected range. Returns `false` with no range selected.
    pub fn crop(&mut self) -> bool {
        let Some(range) = self.selection.range() else {
            return false;
        };
        let cropped = crop(&self.track, range);
        tracing::info!(
            start = range.start(),
            end = range.end(),
            points = cropped.len(),
            "Cropped sequence"
        );
        self.commit_edit(cropped);
        true
    }

    /// Removes the selected range. Returns `false` with no range selected.
    pub fn delete(&mut self) -> bool {
        let Some(range) = self.selection.range() else {
            return false;
        };
        let remaining = delete(&self.track, range);
        tracing::info!(
            start = range.start(),
            end = range.end(),
            points = remaining.len(),
            "Deleted range"
        );
        self.commit_edit(remaining);
        true
    }

    fn commit_edit(&mut self, track: Track) {
        self.replace_track(track);
        self.edited = true;
    }

    pub fn export_blocker(&self) -> Option<ExportBlocker> {
        if self.track.is_empty() {
            Some(ExportBlocker::EmptySequence)
        } else if !self.edited {
            Some(ExportBlocker::NotEdited)
        } else if self.selection.is_dragging() {
            Some(ExportBlocker::DragInProgress)
        } else {
            None
        }
    }

    pub fn can_export(&self) -> bool {
        self.export_blocker().is_none()
    }

    pub fn export_filename(&self) -> String {
        export_filename(self.source_name.as_deref(), &self.config.export.filename_suffix)
    }

    pub fn export_string(&self, exported_at: DateTime<Utc>) -> Result<String> {
        if let Some(blocker) = self.export_blocker() {
            return Err(EditorError::ExportUnavailable(blocker));
        }
        to_gpx_string(&self.track, &self.config.export, exported_at)
    }

    pub fn export_to<W: Write>(&self, exported_at: DateTime<Utc>, writer: W) -> Result<()> {
        if let Some(blocker) = self.export_blocker() {
            return Err(EditorError::ExportUnavailable(blocker));
        }
        write_track(&self.track, &self.config.export, exported_at, writer)?;
        tracing::info!(points = self.track.len(), "Exported sequence");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::DragHandle;
    use crate::track::{Fix, RawTrack, TimedFix};
    use chrono::{Duration, TimeZone};

    const BOUNDS: TimelineBounds = TimelineBounds { left: 0.0, width: 100.0 };

    fn five_point_track() -> IngestOutcome {
        let origin = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let fixes = [10.0, 12.0, 11.0, 13.0, 10.0]
            .iter()
            .enumerate()
            .map(|(i, &ele)| TimedFix {
                fix: Fix::new(35.0 + i as f64 * 0.0001, 139.0, Some(ele)),
                time: origin + Duration::seconds(i as i64),
                device_speed: None,
            })
            .collect();
        IngestOutcome::Loaded(RawTrack::TimeBased(fixes))
    }

    fn loaded_editor() -> TrackEditor {
        let mut editor = TrackEditor::default();
        editor.load(five_point_track(), Some("run.gpx"));
        editor
    }

    fn select(editor: &mut TrackEditor, start: usize, end: usize) {
        let len = editor.track().len();
        for event in [
            PointerEvent::Press(DragHandle::RangeStart),
            PointerEvent::Move { x: BOUNDS.x_of(start, len) },
            PointerEvent::Release,
            PointerEvent::Press(DragHandle::RangeEnd),
            PointerEvent::Move { x: BOUNDS.x_of(end, len) },
            PointerEvent::Release,
        ] {
            editor.handle_pointer(event, &BOUNDS);
        }
    }

    fn elevations(editor: &TrackEditor) -> Vec<Option<f64>> {
        editor.track().points().iter().map(|p| p.elevation).collect()
    }

    #[test]
    fn test_statistics_scenario() {
        let stats = loaded_editor().statistics();
        assert_eq!(stats.elevation_gain_m, 4.0);
        assert_eq!(stats.elevation_loss_m, 4.0);
        assert_eq!(stats.min_elevation_m, 10.0);
        assert_eq!(stats.max_elevation_m, 13.0);
    }

    #[test]
    fn test_crop_keeps_closed_range() {
        let mut editor = loaded_editor();
        select(&mut editor, 1, 3);
        assert!(editor.crop());
        assert_eq!(elevations(&editor), vec![Some(12.0), Some(11.0), Some(13.0)]);
        assert_eq!(editor.track().points()[0].distance_m, 0.0);
        assert!(editor.is_edited());
    }

    #[test]
    fn test_delete_removes_closed_range() {
        let mut editor = loaded_editor();
        let original = editor.track().points().to_vec();
        editor.select_point(2);
        select(&mut editor, 1, 3);
        assert!(editor.delete());

        let remaining = editor.track().points();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].time, original[0].time);
        assert_eq!(remaining[1].time, original[4].time);
        assert_eq!(editor.selection().range(), None);
        assert_eq!(editor.selection().active_index(), None);
    }

    #[test]
    fn test_edit_without_range_is_noop() {
        let mut editor = loaded_editor();
        assert!(!editor.crop());
        assert!(!editor.delete());
        assert_eq!(editor.track().len(), 5);
        assert!(!editor.is_edited());
    }

    #[test]
    fn test_export_preconditions() {
        let mut editor = TrackEditor::default();
        assert_eq!(editor.export_blocker(), Some(ExportBlocker::EmptySequence));

        editor.load(five_point_track(), Some("run.gpx"));
        assert_eq!(editor.export_blocker(), Some(ExportBlocker::NotEdited));
        assert!(matches!(
            editor.export_string(Utc::now()),
            Err(EditorError::ExportUnavailable(ExportBlocker::NotEdited))
        ));

        select(&mut editor, 0, 3);
        editor.crop();
        editor.handle_pointer(PointerEvent::Press(DragHandle::ActivePoint), &BOUNDS);
        assert_eq!(editor.export_blocker(), Some(ExportBlocker::DragInProgress));

        editor.handle_pointer(PointerEvent::Release, &BOUNDS);
        assert!(editor.can_export());
        let text = editor.export_string(Utc::now()).unwrap();
        assert!(text.contains("<trkpt"));
        assert_eq!(editor.export_filename(), "run_edited.gpx");
    }

    #[test]
    fn test_stale_ingest_is_discarded() {
        let mut editor = TrackEditor::default();
        let first = editor.begin_ingest();
        let second = editor.begin_ingest();

        let route =
            IngestOutcome::Loaded(RawTrack::DistanceBased(vec![Fix::new(1.0, 1.0, Some(1.0))]));
        assert_eq!(
            editor.complete_ingest(second, route, Some("route.gpx")),
            LoadStatus::Loaded { kind: SequenceKind::DistanceBased, points: 1 }
        );
        assert_eq!(
            editor.complete_ingest(first, five_point_track(), Some("run.gpx")),
            LoadStatus::Superseded
        );
        assert_eq!(editor.track().len(), 1);
        assert_eq!(editor.source_name(), Some("route.gpx"));
    }

    #[test]
    fn test_no_data_and_reset_clear_state() {
        let mut editor = loaded_editor();
        select(&mut editor, 1, 2);
        editor.crop();
        assert_eq!(editor.load(IngestOutcome::NoData, Some("empty.gpx")), LoadStatus::NoData);
        assert!(editor.track().is_empty());
        assert!(!editor.is_edited());

        let mut editor = loaded_editor();
        editor.select_point(4);
        editor.reset();
        assert!(editor.track().is_empty());
        assert_eq!(editor.selection(), &SelectionState::new());
        assert!(editor.active_point().is_none());
    }

    #[test]
    fn test_free_functions_on_five_points() {
        let editor = loaded_editor();
        let range = SelectionRange::new(1, 3, 5).unwrap();
        assert_eq!(crop(editor.track(), range).len(), 3);
        let rest = delete(editor.track(), range);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest.points()[1].elevation, Some(10.0));
        // original is untouched
        assert_eq!(editor.track().len(), 5);
    }

    #[test]
    fn test_load_keeps_device_speed_from_gpx10() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.0" creator="test" xmlns="http://www.topografix.com/GPX/1/0">
  <trk>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"><time>2024-05-01T10:00:00Z</time><speed>4.5</speed></trkpt>
      <trkpt lat="35.0001" lon="139.0"><time>2024-05-01T10:00:01Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;
        let outcome = crate::ingest::ingest_reader(doc.as_bytes()).unwrap();

        let mut editor = TrackEditor::default();
        assert_eq!(
            editor.load(outcome, Some("device.gpx")),
            LoadStatus::Loaded { kind: SequenceKind::TimeBased, points: 2 }
        );
        assert_eq!(editor.track().points()[0].speed, Some(4.5));
    }
}
