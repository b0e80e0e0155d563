// TOML config adapter - Typed configuration loaded from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::llm_openai::{ChatSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::adapters::tracing_log::LogFormat;
use crate::domain::errors::*;
use crate::domain::model::{CLIP_PADDING, DEFAULT_CATEGORY, MIN_CLIP_LENGTH, SUPPORTED_LANGUAGES};
use crate::engine::{AccelerationMode, EngineConfig, VerticalConfig};
use crate::ports::{EncodingSettings, LogLevel};
use crate::transcript::chunker::{TextChunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// Files tried, in order, when no config path is given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["highlight.toml", "config/highlight.toml"];

const MAX_CRF: u8 = 51;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub selection: SelectionConfig,
    pub llm: LlmConfig,
    pub extraction: ExtractionConfig,
    pub vertical: VerticalSection,
    pub transcript: TranscriptConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Category used when the transcript does not name one
    pub category: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub padding_seconds: i64,
    pub max_concurrent_requests: usize,
    /// Generate titles for segments
    pub titles: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            padding_seconds: CLIP_PADDING,
            max_concurrent_requests: 4,
            titles: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Usually supplied through `OPENAI_API_KEY` instead
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            timeout_secs: 120,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub output_dir: PathBuf,
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub container: String,
    pub min_clip_seconds: f64,
    /// Defaults to the number of CPUs
    pub max_parallel: Option<usize>,
    /// `auto`, `none`, or a method name
    pub acceleration: String,
    pub timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            output_dir: PathBuf::from("output"),
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            container: "mp4".to_string(),
            min_clip_seconds: MIN_CLIP_LENGTH,
            max_parallel: None,
            acceleration: "auto".to_string(),
            timeout_secs: 1800,
            probe_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerticalSection {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
    pub font_file: Option<PathBuf>,
    pub font_size: u32,
    pub font_color: String,
    pub caption_position: f64,
}

impl Default for VerticalSection {
    fn default() -> Self {
        let defaults = VerticalConfig::default();
        Self {
            enabled: false,
            width: defaults.width,
            height: defaults.height,
            font_file: defaults.font_file,
            font_size: defaults.font_size,
            font_color: defaults.font_color,
            caption_position: defaults.caption_position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranscriptConfig {
    /// Languages tried in order
    pub languages: Vec<String>,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Check value ranges and enumerated settings
    pub fn validate(&self) -> Result<(), DomainError> {
        LogLevel::parse(&self.logging.level)?;
        LogFormat::parse(&self.logging.format)?;
        AccelerationMode::parse(&self.extraction.acceleration)?;
        self.chunker()?;

        if self.extraction.crf > MAX_CRF {
            return Err(DomainError::BadArgs(format!(
                "CRF value cannot exceed {}",
                MAX_CRF
            )));
        }
        if self.vertical.width == 0 || self.vertical.height == 0 {
            return Err(DomainError::BadArgs(
                "Vertical canvas width and height must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.vertical.caption_position) {
            return Err(DomainError::BadArgs(
                "Caption position must be between 0 and 1".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0
            || self.extraction.timeout_secs == 0
            || self.extraction.probe_timeout_secs == 0
        {
            return Err(DomainError::BadArgs("Timeouts must be positive".to_string()));
        }
        if self.selection.max_concurrent_requests == 0 || self.extraction.max_parallel == Some(0) {
            return Err(DomainError::BadArgs(
                "Concurrency limits must be positive".to_string(),
            ));
        }
        if !(self.extraction.min_clip_seconds > 0.0) {
            return Err(DomainError::BadArgs(
                "Minimum clip length must be positive".to_string(),
            ));
        }
        if self.extraction.container.trim().is_empty() {
            return Err(DomainError::BadArgs("Container extension is empty".to_string()));
        }
        if self.transcript.languages.is_empty() {
            return Err(DomainError::BadArgs(
                "At least one transcript language is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, DomainError> {
        LogLevel::parse(&self.logging.level)
    }

    pub fn log_format(&self) -> Result<LogFormat, DomainError> {
        LogFormat::parse(&self.logging.format)
    }

    pub fn chunker(&self) -> Result<TextChunker, DomainError> {
        TextChunker::new(self.selection.chunk_size, self.selection.chunk_overlap)
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            request_timeout: Duration::from_secs(self.llm.timeout_secs),
            api_key: self.llm.api_key.clone(),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig, DomainError> {
        let extraction = &self.extraction;
        let vertical = self.vertical.enabled.then(|| VerticalConfig {
            width: self.vertical.width,
            height: self.vertical.height,
            font_file: self.vertical.font_file.clone(),
            font_size: self.vertical.font_size,
            font_color: self.vertical.font_color.clone(),
            caption_position: self.vertical.caption_position,
        });

        Ok(EngineConfig {
            encoding: EncodingSettings {
                video_codec: extraction.video_codec.clone(),
                preset: extraction.preset.clone(),
                crf: extraction.crf,
            },
            audio_codec: extraction.audio_codec.clone(),
            container_extension: extraction.container.trim_start_matches('.').to_string(),
            min_clip_length: extraction.min_clip_seconds,
            max_parallel: extraction
                .max_parallel
                .unwrap_or_else(|| num_cpus::get().max(1)),
            acceleration: AccelerationMode::parse(&extraction.acceleration)?,
            vertical,
        })
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration text; missing keys take their defaults
    pub fn parse(toml_content: &str) -> Result<AppConfig, DomainError> {
        toml::from_str(toml_content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load configuration from a file
    pub fn load(file_path: &Path) -> Result<AppConfig, DomainError> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// First existing default config file, if any
    pub fn discover() -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    /// Render configuration as TOML
    pub fn render(config: &AppConfig) -> Result<String, DomainError> {
        toml::to_string_pretty(config)
            .map_err(|e| DomainError::BadArgs(format!("Failed to serialize config: {}", e)))
    }
}
