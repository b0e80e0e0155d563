// Highlight interactor - Orchestrates the transcript-to-clips use case

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::extract_interactor::ExtractInteractor;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::ExtractionReport;
use crate::planner::SegmentPlanner;
use crate::ports::*;
use crate::selection::{MapReduceSelector, Selection};
use crate::transcript::{TextChunker, TranscriptWindows};
use crate::utils::timed;

/// Selection settings shared by every request
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub default_category: String,
    pub chunker: TextChunker,
    pub padding_seconds: i64,
    pub max_concurrent_requests: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
            chunker: TextChunker::default(),
            padding_seconds: CLIP_PADDING,
            max_concurrent_requests: 4,
        }
    }
}

/// Request for selection and planning only
#[derive(Debug, Clone, Default)]
pub struct SelectRequest {
    pub video_id: String,
    /// Overrides the transcript's category
    pub category: Option<String>,
    /// Overrides the duration used for the target count
    pub duration_seconds: Option<f64>,
    pub titles: bool,
}

/// Request for the full pipeline
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub select: SelectRequest,
    pub source: PathBuf,
    pub output_dir: PathBuf,
}

/// Result of selection and planning
#[derive(Debug, Clone, Serialize)]
pub struct SelectionOutcome {
    pub metadata: VideoMetadata,
    pub selection: Selection,
    pub plan: SegmentPlan,
}

/// Result of a full pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub metadata: VideoMetadata,
    pub selection: Selection,
    pub plan: SegmentPlan,
    pub source_duration: f64,
    pub extraction: ExtractionReport,
}

/// Interactor for the highlight pipeline
pub struct HighlightInteractor {
    transcript_port: Arc<dyn TranscriptPort>,
    model: Arc<dyn SelectionModelPort>,
    log_port: Arc<dyn LogPort>,
    extractor: Arc<ExtractInteractor>,
    settings: PipelineSettings,
}

impl HighlightInteractor {
    /// Create new highlight interactor with injected ports
    pub fn new(
        transcript_port: Arc<dyn TranscriptPort>,
        model: Arc<dyn SelectionModelPort>,
        log_port: Arc<dyn LogPort>,
        extractor: Arc<ExtractInteractor>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            transcript_port,
            model,
            log_port,
            extractor,
            settings,
        }
    }

    /// Fetch the transcript, select highlights and plan segments
    pub async fn select(&self, request: &SelectRequest) -> Result<SelectionOutcome, DomainError> {
        let transcript = timed(
            self.log_port.as_ref(),
            "transcript fetch",
            self.transcript_port.fetch_transcript(&request.video_id),
        )
        .await?;
        let metadata = self.metadata(request, &transcript);

        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Info, "Transcript loaded")
                    .with("video_id", &metadata.video_id)
                    .with("lines", transcript.lines.len())
                    .with("language", metadata.language.as_deref().unwrap_or("unknown"))
                    .with("category", &metadata.category)
                    .with("duration", format!("{:.1}", metadata.duration_seconds)),
            )
            .await;

        let windows = TranscriptWindows::group(&transcript.lines);
        let selector = MapReduceSelector::new(
            Arc::clone(&self.model),
            Arc::clone(&self.log_port),
            self.settings.chunker.clone(),
            self.settings.max_concurrent_requests,
        );
        let selection = timed(
            self.log_port.as_ref(),
            "highlight selection",
            selector.select(&metadata.category, &windows, metadata.duration_seconds),
        )
        .await?;

        let mut planner =
            SegmentPlanner::new(Arc::clone(&self.log_port), self.settings.padding_seconds);
        if request.titles {
            planner = planner.with_titles(
                Arc::clone(&self.model),
                self.settings.max_concurrent_requests,
            );
        }
        let plan = timed(
            self.log_port.as_ref(),
            "segment planning",
            planner.plan(&metadata.category, &selection.selected, &transcript),
        )
        .await;

        self.log_port
            .info(&format!(
                "Planned {} segment(s) from {} candidate(s)",
                plan.len(),
                selection.candidates.len()
            ))
            .await;

        Ok(SelectionOutcome {
            metadata,
            selection,
            plan,
        })
    }

    /// Run selection and source preparation concurrently, then extract
    pub async fn run(&self, request: &RunRequest) -> Result<RunReport, DomainError> {
        let (outcome, source_duration) = tokio::try_join!(
            self.select(&request.select),
            self.extractor.prepare_source(&request.source),
        )?;

        let extraction = self
            .extractor
            .extract(
                &outcome.plan,
                &request.source,
                source_duration,
                &request.output_dir,
            )
            .await?;

        Ok(RunReport {
            generated_at: Utc::now(),
            metadata: outcome.metadata,
            selection: outcome.selection,
            plan: outcome.plan,
            source_duration,
            extraction,
        })
    }

    fn metadata(&self, request: &SelectRequest, transcript: &Transcript) -> VideoMetadata {
        let category = request
            .category
            .clone()
            .or_else(|| transcript.category.clone())
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_category.clone());
        let duration_seconds = request
            .duration_seconds
            .or(transcript.duration)
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or_else(|| transcript.span_seconds());

        VideoMetadata {
            video_id: request.video_id.clone(),
            title: transcript.title.clone(),
            category,
            duration_seconds,
            language: transcript.language.clone(),
        }
    }
}
