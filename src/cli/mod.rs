//! CLI module for the highlight clipper
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Highlight clipper
///
/// Selects the most interesting minutes of a video from its transcript with a
/// language model and cuts them into standalone clips.
#[derive(Parser, Debug)]
#[command(name = "highlighter")]
#[command(about = "Transcript-driven highlight clipper")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (text, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Configuration file (default: highlight.toml or config/highlight.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select highlights from a transcript and cut them from the video
    Run(args::RunArgs),
    /// Select highlights and print the segment plan
    Select(args::SelectArgs),
    /// Cut the segments of a saved plan from a video
    Extract(args::ExtractArgs),
    /// Show source duration and the acceleration that would be used
    Inspect(args::InspectArgs),
    /// List published clips in an output directory
    List(args::ListArgs),
}
