//! Per-segment extraction with join-all fan-out

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tempfile::NamedTempFile;
use tokio::sync::Semaphore;

use crate::domain::errors::DomainError;
use crate::domain::model::{ClipRange, SegmentPlan, TimeSegment};
use crate::engine::acceleration::{AccelerationSelector, HardwareAcceleration};
use crate::engine::command;
use crate::engine::{ClipOutcome, EngineConfig, ExtractionReport, SegmentState, VerticalConfig};
use crate::output::{self, ClipPublisher};
use crate::ports::{AudioMode, LogEvent, LogLevel, LogPort, MediaBackendPort, MediaJob};

/// Shared state of one extraction run
struct RunContext {
    backend: Arc<dyn MediaBackendPort>,
    log_port: Arc<dyn LogPort>,
    publisher: ClipPublisher,
    config: EngineConfig,
    source: PathBuf,
    source_duration: f64,
    output_dir: PathBuf,
    acceleration: Option<HardwareAcceleration>,
}

/// Extracts every planned segment concurrently.
///
/// Segments never cancel each other: each one ends `Published` or `Failed`
/// and the report lists all of them in plan order.
pub struct ClipEngine {
    backend: Arc<dyn MediaBackendPort>,
    log_port: Arc<dyn LogPort>,
    publisher: ClipPublisher,
    config: EngineConfig,
    acceleration: AccelerationSelector,
}

impl ClipEngine {
    pub fn new(
        backend: Arc<dyn MediaBackendPort>,
        log_port: Arc<dyn LogPort>,
        config: EngineConfig,
    ) -> Self {
        let acceleration = AccelerationSelector::new(config.acceleration);
        let publisher = ClipPublisher::new(Arc::clone(&log_port));
        Self {
            backend,
            log_port,
            publisher,
            config,
            acceleration,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Acceleration the engine uses, probing the backend on first call
    pub async fn acceleration(&self) -> Option<HardwareAcceleration> {
        self.acceleration
            .resolve(self.backend.as_ref(), self.log_port.as_ref())
            .await
    }

    /// Extract all segments of `plan` from `source` into `output_dir`.
    ///
    /// Only failing to create the output directory is an error; segment
    /// failures are reported per outcome.
    pub async fn extract(
        &self,
        source: &Path,
        source_duration: f64,
        plan: &SegmentPlan,
        output_dir: &Path,
    ) -> Result<ExtractionReport, DomainError> {
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        let acceleration = self.acceleration().await;
        let context = Arc::new(RunContext {
            backend: Arc::clone(&self.backend),
            log_port: Arc::clone(&self.log_port),
            publisher: self.publisher.clone(),
            config: self.config.clone(),
            source: source.to_path_buf(),
            source_duration,
            output_dir: output_dir.to_path_buf(),
            acceleration,
        });

        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Info, "Starting extraction")
                    .with("segments", plan.len())
                    .with("source", source.display())
                    .with("source_duration", format!("{:.3}", source_duration))
                    .with("max_parallel", self.config.max_parallel)
                    .with(
                        "acceleration",
                        acceleration.map_or("none".to_string(), |m| m.to_string()),
                    ),
            )
            .await;

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let handles: Vec<_> = plan
            .segments
            .iter()
            .cloned()
            .map(|segment| {
                let context = Arc::clone(&context);
                let semaphore = Arc::clone(&semaphore);
                let ordinal = segment.ordinal;
                let file_stem = segment.file_stem.clone();
                let handle = tokio::spawn(async move {
                    context.report_state(segment.ordinal, &SegmentState::Planned).await;
                    let _permit = semaphore.acquire_owned().await;
                    context.report_state(segment.ordinal, &SegmentState::Extracting).await;
                    extract_segment(context, segment).await
                });
                (ordinal, file_stem, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (ordinal, file_stem, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => ClipOutcome {
                    ordinal,
                    file_stem,
                    range: None,
                    state: SegmentState::Failed {
                        reason: format!("extraction task did not complete: {}", e),
                    },
                    elapsed_ms: 0,
                },
            };
            outcomes.push(outcome);
        }

        let report = ExtractionReport {
            source: source.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            acceleration,
            outcomes,
        };
        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Info, "Extraction finished")
                    .with("published", report.published_count())
                    .with("failed", report.failed().count()),
            )
            .await;
        Ok(report)
    }
}

async fn extract_segment(context: Arc<RunContext>, segment: TimeSegment) -> ClipOutcome {
    let started = Instant::now();
    let extension = context.config.container_extension.clone();
    let temp = output::temp_path(&context.output_dir, segment.ordinal, &extension);
    let vertical_temp = output::vertical_temp_path(&context.output_dir, segment.ordinal, &extension);
    let final_path = context.output_dir.join(segment.file_name(&extension));

    let range = ClipRange::clamp(
        &segment,
        context.source_duration,
        context.config.min_clip_length,
    );
    let result = match &range {
        Ok(range) => {
            let range = *range;
            context
                .log_port
                .debug(&format!(
                    "Segment {} extracting {} -> {}",
                    segment.ordinal,
                    range,
                    final_path.display()
                ))
                .await;
            match context.produce(&segment, range, &temp, &vertical_temp).await {
                Ok(ready) => context.publisher.publish(&ready, &final_path).await,
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e.clone()),
    };

    context.publisher.discard(&temp).await;
    context.publisher.discard(&vertical_temp).await;

    let state = match result {
        Ok(path) => {
            context
                .log_port
                .info(&format!("Segment {} published: {}", segment.ordinal, path.display()))
                .await;
            SegmentState::Published { path }
        }
        Err(e) => {
            context
                .log_port
                .log_event(
                    &LogEvent::new(LogLevel::Error, "Segment failed")
                        .with("ordinal", segment.ordinal)
                        .with("reason", &e),
                )
                .await;
            SegmentState::Failed {
                reason: e.to_string(),
            }
        }
    };

    context.report_state(segment.ordinal, &state).await;

    ClipOutcome {
        ordinal: segment.ordinal,
        file_stem: segment.file_stem,
        range: range.ok(),
        state,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

impl RunContext {
    async fn report_state(&self, ordinal: usize, state: &SegmentState) {
        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Debug, "Segment state")
                    .with("ordinal", ordinal)
                    .with("state", state.label()),
            )
            .await;
    }

    /// Run the trim step and the optional reflow step; returns the file to publish
    async fn produce(
        &self,
        segment: &TimeSegment,
        range: ClipRange,
        temp: &Path,
        vertical_temp: &Path,
    ) -> Result<PathBuf, DomainError> {
        let trim = MediaJob {
            input: self.source.clone(),
            start: Some(range.start),
            duration: Some(range.duration()),
            acceleration: self.acceleration,
            video_filter: None,
            encoding: self.config.encoding.clone(),
            audio: AudioMode::Encode(self.config.audio_codec.clone()),
            output: temp.to_path_buf(),
        };
        self.run_job(&trim).await?;

        let Some(vertical) = &self.config.vertical else {
            return Ok(temp.to_path_buf());
        };

        let caption = write_caption(&self.output_dir, &segment.caption())?;
        let reflow = reflow_job(temp, vertical_temp, vertical, caption.path(), &self.config);
        self.run_job(&reflow).await?;
        Ok(vertical_temp.to_path_buf())
    }

    async fn run_job(&self, job: &MediaJob) -> Result<(), DomainError> {
        let status = self.backend.run(job).await?;
        if !status.success {
            return Err(DomainError::ExtractionFailure(format!(
                "backend exited with {}: {}",
                status
                    .exit_code
                    .map_or("no exit code".to_string(), |code| format!("code {}", code)),
                status.diagnostics.trim()
            )));
        }
        if !tokio::fs::try_exists(&job.output).await.unwrap_or(false) {
            return Err(DomainError::ExtractionFailure(format!(
                "backend reported success but {} is missing",
                job.output.display()
            )));
        }
        Ok(())
    }
}

fn reflow_job(
    input: &Path,
    output: &Path,
    vertical: &VerticalConfig,
    caption_file: &Path,
    config: &EngineConfig,
) -> MediaJob {
    MediaJob {
        input: input.to_path_buf(),
        start: None,
        duration: None,
        acceleration: None,
        video_filter: Some(command::vertical_filter(vertical, caption_file)),
        encoding: config.encoding.clone(),
        audio: AudioMode::Copy,
        output: output.to_path_buf(),
    }
}

/// Caption text file, removed when dropped
fn write_caption(dir: &Path, caption: &str) -> Result<NamedTempFile, DomainError> {
    let mut file = tempfile::Builder::new()
        .prefix(".caption_")
        .suffix(".txt")
        .tempfile_in(dir)
        .map_err(|e| DomainError::FsFail(format!("Failed to create caption file: {}", e)))?;
    file.write_all(caption.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| DomainError::FsFail(format!("Failed to write caption file: {}", e)))?;
    Ok(file)
}
