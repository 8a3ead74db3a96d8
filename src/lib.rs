//! GPX track viewing and editing core.
//!
//! Ingest a GPX document, smooth it into analyzable points, select a range on
//! a timeline, crop or delete it, and write the result back out as GPX.

pub mod config;
pub mod distance;
pub mod editor;
pub mod error;
pub mod export;
pub mod ingest;
pub mod profile;
pub mod selection;
pub mod smoothing;
pub mod stats;
pub mod track;

pub use config::{EditorConfig, ExportConfig, SmoothingConfig};
pub use editor::{IngestTicket, LoadStatus, TrackEditor};
pub use error::{EditorError, ExportBlocker, Result};
pub use ingest::IngestOutcome;
pub use selection::{
    DragHandle, DragState, PointerEvent, SelectionRange, SelectionState, TimelineBounds,
};
pub use stats::TrackStatistics;
pub use track::{Fix, RawTrack, SequenceKind, TimedFix, Track, TrackPoint};
