//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Extraction options shared by `run` and `extract`
#[derive(Args, Debug, Clone, Default)]
pub struct ExtractionOptions {
    /// Output directory (default: <extraction.output_dir>/<video file stem>)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Reflow clips to a vertical canvas with a caption
    #[arg(long)]
    pub vertical: bool,

    /// Font file for vertical captions
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Hardware acceleration: auto, none, or a method name
    #[arg(long)]
    pub acceleration: Option<String>,

    /// Maximum concurrent extractions
    #[arg(long)]
    pub max_parallel: Option<usize>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Transcript JSON file, or directory of <video-id>.<lang>.json files
    #[arg(short, long)]
    pub transcript: PathBuf,

    /// Source video file
    #[arg(short, long)]
    pub video: PathBuf,

    /// Video identifier (default: video file stem)
    #[arg(long)]
    pub video_id: Option<String>,

    /// Content category used in prompts
    #[arg(short, long)]
    pub category: Option<String>,

    /// Generate titles and name clips after them
    #[arg(long)]
    pub titles: bool,

    #[command(flatten)]
    pub extraction: ExtractionOptions,

    /// Also write the full JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the select command
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Transcript JSON file, or directory of <video-id>.<lang>.json files
    #[arg(short, long)]
    pub transcript: PathBuf,

    /// Video identifier (default: transcript file stem)
    #[arg(long)]
    pub video_id: Option<String>,

    /// Content category used in prompts
    #[arg(short, long)]
    pub category: Option<String>,

    /// Video duration in seconds (default: from the transcript)
    #[arg(long)]
    pub duration: Option<f64>,

    /// Generate titles and name clips after them
    #[arg(long)]
    pub titles: bool,

    /// Save the plan to this file instead of printing it
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Plan JSON written by `select`
    #[arg(short, long)]
    pub plan: PathBuf,

    /// Source video file
    #[arg(short, long)]
    pub video: PathBuf,

    #[command(flatten)]
    pub extraction: ExtractionOptions,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Source video file
    #[arg(short, long)]
    pub video: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output directory to list
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
