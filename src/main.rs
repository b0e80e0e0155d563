//! Highlight Clipper CLI
//!
//! Turns a video and its transcript into a handful of highlight clips.
//!
//! # Usage
//!
//! ```bash
//! highlighter run --transcript match.json --video match.mp4 --titles
//! highlighter select --transcript transcripts/ --video-id abc123 --save plan.json
//! highlighter extract --plan plan.json --video match.mp4 --vertical
//! highlighter inspect --video match.mp4
//! highlighter list --output-dir output/match
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use highlight_clipper::adapters::tracing_log::init_subscriber;
use highlight_clipper::app::container::DefaultAppContainer;
use highlight_clipper::cli::{commands, Cli};
use highlight_clipper::config_initialization::initialize_configuration_hierarchy;

/// Main entry point for the highlight clipper CLI
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = initialize_configuration_hierarchy(&cli)?;
    let config = resolved.config;
    init_subscriber(config.log_level()?, config.log_format()?);

    match &resolved.file {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file found; using defaults"),
    }
    if !resolved.env_overrides.is_empty() {
        info!(
            "Applied environment overrides: {}",
            resolved.env_overrides.join(", ")
        );
    }

    let container = DefaultAppContainer::new(&config)?;
    commands::execute(cli.command, &container, &config).await
}
