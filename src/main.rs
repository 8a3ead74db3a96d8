use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gpx_track_editor::ingest::{normalize, read_gpx_file};
use gpx_track_editor::profile::write_profile_csv;
use gpx_track_editor::{
    DragHandle, EditorConfig, LoadStatus, PointerEvent, SequenceKind, TimelineBounds, TrackEditor,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "View, crop and trim GPX tracks", long_about = None)]
struct Cli {
    /// JSON file overriding smoothing windows and export settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print distance and elevation statistics
    Stats {
        input: PathBuf,
    },
    /// Keep only the points between --start and --end (inclusive)
    Crop(EditArgs),
    /// Remove the points between --start and --end (inclusive)
    Delete(EditArgs),
    /// Write the per-point distance/elevation/speed profile as CSV
    Profile {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EditArgs {
    input: PathBuf,
    #[arg(long)]
    start: usize,
    #[arg(long)]
    end: usize,
    /// Output file (defaults to the input name with the export suffix)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
enum EditKind {
    Crop,
    Delete,
}

// Virtual timeline used to drive range selection from the command line
const TIMELINE: TimelineBounds = TimelineBounds { left: 0.0, width: 1000.0 };

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::from_json_file(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Stats { input } => run_stats(&input, config),
        Command::Crop(args) => run_edit(&args, EditKind::Crop, config),
        Command::Delete(args) => run_edit(&args, EditKind::Delete, config),
        Command::Profile { input, output } => run_profile(&input, &output, config),
    }
}

fn load_editor(
    input: &Path,
    config: EditorConfig,
) -> Result<Option<TrackEditor>, Box<dyn std::error::Error>> {
    let mut editor = TrackEditor::new(config);
    let ticket = editor.begin_ingest();
    let outcome = normalize(&read_gpx_file(input)?);
    let source_name = input.file_name().and_then(|n| n.to_str());

    match editor.complete_ingest(ticket, outcome, source_name) {
        LoadStatus::Loaded { kind, points } => {
            let label = match kind {
                SequenceKind::TimeBased => "time-based track",
                SequenceKind::DistanceBased => "distance-based route",
            };
            println!("📄 Loaded {} ({} points) from {}", label, points, input.display());
            Ok(Some(editor))
        }
        LoadStatus::NoData => {
            println!("⚠️  No track or route data in {}", input.display());
            Ok(None)
        }
        LoadStatus::Superseded => Ok(None),
    }
}

fn run_stats(input: &Path, config: EditorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Some(editor) = load_editor(input, config)? else {
        return Ok(());
    };

    let stats = editor.statistics();
    println!("\n📊 TRACK STATISTICS");
    println!("===================");
    println!("  Total distance: {:.2} km", stats.total_distance_km);
    println!("  Elevation gain: {:.0} m", stats.elevation_gain_m);
    println!("  Elevation loss: {:.0} m", stats.elevation_loss_m);
    println!("  Min elevation:  {:.0} m", stats.min_elevation_m);
    println!("  Max elevation:  {:.0} m", stats.max_elevation_m);
    if let Some(rect) = editor.bounds() {
        println!(
            "  Bounds: lat {:.5}..{:.5}, lon {:.5}..{:.5}",
            rect.min().y,
            rect.max().y,
            rect.min().x,
            rect.max().x
        );
    }
    Ok(())
}

fn run_edit(
    args: &EditArgs,
    kind: EditKind,
    config: EditorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(mut editor) = load_editor(&args.input, config)? else {
        return Ok(());
    };

    let len = editor.track().len();
    if args.start > args.end || args.end >= len {
        let message = format!("range {}..={} is outside 0..={}", args.start, args.end, len - 1);
        return Err(message.into());
    }

    for event in [
        PointerEvent::Press(DragHandle::RangeStart),
        PointerEvent::Move { x: TIMELINE.x_of(args.start, len) },
        PointerEvent::Release,
        PointerEvent::Press(DragHandle::RangeEnd),
        PointerEvent::Move { x: TIMELINE.x_of(args.end, len) },
        PointerEvent::Release,
    ] {
        editor.handle_pointer(event, &TIMELINE);
    }

    let Some(range) = editor.selection().range() else {
        println!("ℹ️  No range selected, nothing changed");
        return Ok(());
    };
    match kind {
        EditKind::Crop => editor.crop(),
        EditKind::Delete => editor.delete(),
    };
    println!(
        "✂️  {:?} {}..={} ({} points) → {} points remain",
        kind,
        range.start(),
        range.end(),
        range.point_count(),
        editor.track().len()
    );

    if let Some(blocker) = editor.export_blocker() {
        println!("⚠️  Nothing exported: {}", blocker);
        return Ok(());
    }

    let output = args.output.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(editor.export_filename())
    });
    let writer = BufWriter::new(File::create(&output)?);
    editor.export_to(Utc::now(), writer)?;
    println!("📁 Saved: {}", output.display());
    Ok(())
}

fn run_profile(
    input: &Path,
    output: &Path,
    config: EditorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(editor) = load_editor(input, config)? else {
        return Ok(());
    };

    let writer = BufWriter::new(File::create(output)?);
    write_profile_csv(editor.track(), writer)?;
    println!("📁 Profile saved to: {}", output.display());
    Ok(())
}
