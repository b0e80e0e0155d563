// Inspect interactor - Reports what the engine would do with a source

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::app::extract_interactor::ExtractInteractor;
use crate::domain::errors::*;
use crate::domain::rules::SelectionRules;
use crate::engine::{ClipEngine, HardwareAcceleration};
use crate::utils::format_seconds;

/// Source video summary
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub duration_display: String,
    /// Highlights that would be selected for a video of this length
    pub target_count: usize,
    pub acceleration_mode: String,
    pub acceleration: Option<HardwareAcceleration>,
}

/// Interactor for source inspection
pub struct InspectInteractor {
    extractor: Arc<ExtractInteractor>,
    engine: Arc<ClipEngine>,
}

impl InspectInteractor {
    pub fn new(extractor: Arc<ExtractInteractor>, engine: Arc<ClipEngine>) -> Self {
        Self { extractor, engine }
    }

    pub async fn inspect(&self, source: &Path) -> Result<SourceReport, DomainError> {
        let duration_seconds = self.extractor.prepare_source(source).await?;
        let acceleration = self.engine.acceleration().await;

        Ok(SourceReport {
            path: source.to_path_buf(),
            duration_seconds,
            duration_display: format_seconds(duration_seconds),
            target_count: SelectionRules::target_count(duration_seconds),
            acceleration_mode: self.engine.config().acceleration.to_string(),
            acceleration,
        })
    }
}
