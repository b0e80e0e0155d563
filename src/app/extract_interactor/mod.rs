// Extract interactor - Source preparation and clip extraction use case

use std::path::Path;
use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::{ClipEngine, ExtractionReport};
use crate::ports::*;
use crate::utils::timed;

/// Interactor for extracting planned segments from a source video
pub struct ExtractInteractor {
    probe_port: Arc<dyn ProbePort>,
    engine: Arc<ClipEngine>,
    log_port: Arc<dyn LogPort>,
}

impl ExtractInteractor {
    /// Create new extract interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        engine: Arc<ClipEngine>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            probe_port,
            engine,
            log_port,
        }
    }

    /// Check the source exists and probe its duration
    pub async fn prepare_source(&self, source: &Path) -> Result<f64, DomainError> {
        if !source.is_file() {
            return Err(DomainError::MetadataUnavailable(format!(
                "Source video not found: {}",
                source.display()
            )));
        }
        let duration = timed(
            self.log_port.as_ref(),
            "source probe",
            self.probe_port.probe_duration(&source.to_string_lossy()),
        )
        .await?;
        self.log_port
            .info(&format!(
                "Source {} is {:.3}s long",
                source.display(),
                duration
            ))
            .await;
        Ok(duration)
    }

    /// Extract a plan from a source whose duration is already known
    pub async fn extract(
        &self,
        plan: &SegmentPlan,
        source: &Path,
        source_duration: f64,
        output_dir: &Path,
    ) -> Result<ExtractionReport, DomainError> {
        if plan.is_empty() {
            self.log_port.warn("Plan has no segments; nothing to extract").await;
        }
        timed(
            self.log_port.as_ref(),
            "extraction",
            self.engine.extract(source, source_duration, plan, output_dir),
        )
        .await
    }

    /// Probe the source, then extract the plan
    pub async fn extract_plan(
        &self,
        plan: &SegmentPlan,
        source: &Path,
        output_dir: &Path,
    ) -> Result<ExtractionReport, DomainError> {
        let duration = self.prepare_source(source).await?;
        self.extract(plan, source, duration, output_dir).await
    }
}
