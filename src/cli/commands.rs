//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::AppConfig;
use crate::app::container::AppContainer;
use crate::app::{RunRequest, SelectRequest};
use crate::cli::args::{ExtractArgs, ExtractionOptions, InspectArgs, ListArgs, RunArgs, SelectArgs};
use crate::cli::Commands;
use crate::domain::model::SegmentPlan;
use crate::engine::{ExtractionReport, SegmentState};
use crate::error::{HighlightError, HighlightResult};
use crate::output::list_published_clips;
use crate::utils::format_seconds;

/// Execute the parsed command
pub async fn execute(command: Commands, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Run(args) => run(args, container, config).await,
        Commands::Select(args) => select(args, container, config).await,
        Commands::Extract(args) => extract(args, container, config).await,
        Commands::Inspect(args) => inspect(args, container).await,
        Commands::List(args) => list(args, config),
    }
}

/// Execute the run command
pub async fn run(args: RunArgs, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    let video_id = args
        .video_id
        .clone()
        .unwrap_or_else(|| file_stem(&args.video));
    let output_dir = resolve_output_dir(&args.extraction, &args.video, config);
    info!("Running highlight pipeline for '{}'", video_id);

    let request = RunRequest {
        select: SelectRequest {
            video_id,
            category: args.category.clone(),
            duration_seconds: None,
            titles: config.selection.titles,
        },
        source: args.video.clone(),
        output_dir,
    };

    let report = container
        .highlight_interactor(&args.transcript)
        .run(&request)
        .await
        .context("Highlight pipeline failed")?;

    if let Some(path) = &args.report {
        write_json(path, &report)?;
        info!("Report written to {}", path.display());
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Selected {} of {} candidate window(s) (target {})",
            report.selection.selected.len(),
            report.selection.candidates.len(),
            report.selection.target_count
        );
        print_extraction(&report.extraction);
    }

    ensure_some_published(&report.extraction)
}

/// Execute the select command
pub async fn select(args: SelectArgs, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    let request = SelectRequest {
        video_id: args
            .video_id
            .clone()
            .unwrap_or_else(|| file_stem(&args.transcript)),
        category: args.category.clone(),
        duration_seconds: args.duration,
        titles: config.selection.titles,
    };

    let outcome = container
        .highlight_interactor(&args.transcript)
        .select(&request)
        .await
        .context("Highlight selection failed")?;

    match &args.save {
        Some(path) => {
            write_json(path, &outcome.plan)?;
            println!("Saved {} segment(s) to {}", outcome.plan.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&outcome.plan)?),
    }
    Ok(())
}

/// Execute the extract command
pub async fn extract(args: ExtractArgs, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    let plan = read_plan(&args.plan)?;
    let output_dir = resolve_output_dir(&args.extraction, &args.video, config);

    let report = container
        .extract_interactor()
        .extract_plan(&plan, &args.video, &output_dir)
        .await
        .context("Extraction failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_extraction(&report);
    }
    ensure_some_published(&report)
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs, container: &dyn AppContainer) -> Result<()> {
    let report = container
        .inspect_interactor()
        .inspect(&args.video)
        .await
        .with_context(|| format!("Failed to inspect {}", args.video.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Source:        {}", report.path.display());
        println!(
            "Duration:      {} ({:.3}s)",
            report.duration_display, report.duration_seconds
        );
        println!("Highlights:    up to {}", report.target_count);
        println!(
            "Acceleration:  {} (mode {})",
            report
                .acceleration
                .map_or("none".to_string(), |m| m.to_string()),
            report.acceleration_mode
        );
    }
    Ok(())
}

/// Execute the list command
pub fn list(args: ListArgs, config: &AppConfig) -> Result<()> {
    let clips = list_published_clips(&args.output_dir, &config.extraction.container)
        .with_context(|| format!("Failed to list {}", args.output_dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&clips)?);
    } else if clips.is_empty() {
        println!("No clips in {}", args.output_dir.display());
    } else {
        for clip in &clips {
            println!("{:>12}  {}", clip.size_bytes, clip.path.display());
        }
    }
    Ok(())
}

fn print_extraction(report: &ExtractionReport) {
    for outcome in &report.outcomes {
        let range = outcome
            .range
            .map(|r| format!("{} - {}", format_seconds(r.start), format_seconds(r.end)))
            .unwrap_or_else(|| "-".to_string());
        match &outcome.state {
            SegmentState::Published { path } => {
                println!("[{}] ok      {}  {}", outcome.ordinal, range, path.display())
            }
            SegmentState::Failed { reason } => {
                println!("[{}] failed  {}  {}", outcome.ordinal, range, reason)
            }
            other => println!("[{}] {:?}", outcome.ordinal, other),
        }
    }
    println!(
        "{} of {} clip(s) published to {}",
        report.published_count(),
        report.outcomes.len(),
        report.output_dir.display()
    );
}

/// A non-empty run where every segment failed is an error
fn ensure_some_published(report: &ExtractionReport) -> Result<()> {
    if !report.outcomes.is_empty() && report.published_count() == 0 {
        anyhow::bail!("All {} segment(s) failed", report.outcomes.len());
    }
    Ok(())
}

fn resolve_output_dir(options: &ExtractionOptions, video: &Path, config: &AppConfig) -> PathBuf {
    options
        .output_dir
        .clone()
        .unwrap_or_else(|| config.extraction.output_dir.join(file_stem(video)))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "video".to_string())
}

fn read_plan(path: &Path) -> HighlightResult<SegmentPlan> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| HighlightError::InvalidPlan {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> HighlightResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_dir_uses_video_stem() {
        let config = AppConfig::default();
        let dir = resolve_output_dir(&ExtractionOptions::default(), Path::new("/v/match.mp4"), &config);
        assert_eq!(dir, PathBuf::from("output/match"));
    }

    #[test]
    fn test_plan_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plans/plan.json");
        let plan = SegmentPlan {
            category: "News".to_string(),
            segments: vec![crate::domain::model::TimeSegment::around_window(
                0,
                crate::domain::model::WindowIndex(2),
                10,
            )],
        };
        write_json(&path, &plan).unwrap();
        assert_eq!(read_plan(&path).unwrap(), plan);
    }

    #[test]
    fn test_malformed_plan_is_invalid_plan() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            read_plan(&path),
            Err(HighlightError::InvalidPlan { .. })
        ));
    }
}
