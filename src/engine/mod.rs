//! Concurrent clip extraction engine

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::{ClipRange, MIN_CLIP_LENGTH};
use crate::ports::EncodingSettings;

pub mod acceleration;
pub mod clipper;
pub mod command;

pub use acceleration::{AccelerationMode, AccelerationSelector, HardwareAcceleration};
pub use clipper::ClipEngine;

/// Canvas and caption settings for vertical reflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalConfig {
    pub width: u32,
    pub height: u32,
    /// Font file for the caption; the fontconfig default is used when unset
    pub font_file: Option<PathBuf>,
    pub font_size: u32,
    pub font_color: String,
    /// Vertical caption position as a fraction of the canvas height
    pub caption_position: f64,
}

impl Default for VerticalConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            font_file: None,
            font_size: 64,
            font_color: "white".to_string(),
            caption_position: 0.1,
        }
    }
}

/// Clip extraction engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub encoding: EncodingSettings,
    pub audio_codec: String,
    /// Container extension of published clips, without the dot
    pub container_extension: String,
    /// Clamped clips shorter than this are extended backward
    pub min_clip_length: f64,
    /// Maximum concurrently running extractions
    pub max_parallel: usize,
    pub acceleration: AccelerationMode,
    /// Reflow every clip to a vertical canvas when set
    pub vertical: Option<VerticalConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            encoding: EncodingSettings {
                video_codec: "libx264".to_string(),
                preset: "ultrafast".to_string(),
                crf: 23,
            },
            audio_codec: "aac".to_string(),
            container_extension: "mp4".to_string(),
            min_clip_length: MIN_CLIP_LENGTH,
            max_parallel: num_cpus::get().max(1),
            acceleration: AccelerationMode::Auto,
            vertical: None,
        }
    }
}

/// Lifecycle of one segment in the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SegmentState {
    Planned,
    Extracting,
    Published { path: PathBuf },
    Failed { reason: String },
}

impl SegmentState {
    pub fn is_published(&self) -> bool {
        matches!(self, SegmentState::Published { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            SegmentState::Planned => "planned",
            SegmentState::Extracting => "extracting",
            SegmentState::Published { .. } => "published",
            SegmentState::Failed { .. } => "failed",
        }
    }
}

/// Final state of one segment after extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipOutcome {
    pub ordinal: usize,
    pub file_stem: String,
    /// Range actually extracted; absent when clamping rejected the segment
    pub range: Option<ClipRange>,
    pub state: SegmentState,
    pub elapsed_ms: u64,
}

impl ClipOutcome {
    pub fn published_path(&self) -> Option<&PathBuf> {
        match &self.state {
            SegmentState::Published { path } => Some(path),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            SegmentState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Per-segment results of one extraction run, in plan order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub acceleration: Option<HardwareAcceleration>,
    pub outcomes: Vec<ClipOutcome>,
}

impl ExtractionReport {
    pub fn published(&self) -> impl Iterator<Item = &ClipOutcome> {
        self.outcomes.iter().filter(|o| o.state.is_published())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ClipOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.state, SegmentState::Failed { .. }))
    }

    pub fn published_count(&self) -> usize {
        self.published().count()
    }

    pub fn all_published(&self) -> bool {
        self.outcomes.iter().all(|o| o.state.is_published())
    }
}
