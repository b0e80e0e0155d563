// Ports - Interface definitions (contracts)

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::acceleration::HardwareAcceleration;

/// Port for fetching a video's transcript and metadata
#[async_trait]
pub trait TranscriptPort: Send + Sync {
    /// Fetch the transcript for a video identifier
    async fn fetch_transcript(&self, video_id: &str) -> Result<Transcript, DomainError>;
}

/// Port for the raw text-in/text-out language model service
#[async_trait]
pub trait TextCompletionPort: Send + Sync {
    /// Complete a single prompt and return the model's text
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Port for the three highlight-selection model operations.
///
/// Implementations own prompt construction and all parsing of the
/// model's free-form text; callers only see typed results.
#[async_trait]
pub trait SelectionModelPort: Send + Sync {
    /// Map phase: nominate window indices appearing in one chunk
    async fn nominate(&self, category: &str, chunk: &str)
        -> Result<Vec<WindowIndex>, DomainError>;

    /// Reduce phase: pick at most `target_count` windows from candidate text
    async fn condense(
        &self,
        category: &str,
        candidates_text: &str,
        target_count: usize,
    ) -> Result<Vec<WindowIndex>, DomainError>;

    /// Generate a short title for the text of one segment
    async fn title(&self, category: &str, segment_text: &str) -> Result<String, DomainError>;
}

/// Port for probing source media
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of a media file in seconds
    async fn probe_duration(&self, file_path: &str) -> Result<f64, DomainError>;
}

/// Audio handling for a media job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioMode {
    /// Re-encode with the given codec
    Encode(String),
    /// Copy the audio stream as-is
    Copy,
}

/// Video encoding settings for a media job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingSettings {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
}

/// One invocation of the media backend
#[derive(Debug, Clone, PartialEq)]
pub struct MediaJob {
    pub input: PathBuf,
    /// Seek offset in seconds
    pub start: Option<f64>,
    /// Output length in seconds
    pub duration: Option<f64>,
    pub acceleration: Option<HardwareAcceleration>,
    /// Video filter chain (`-vf`)
    pub video_filter: Option<String>,
    pub encoding: EncodingSettings,
    pub audio: AudioMode,
    pub output: PathBuf,
}

/// Result of a finished backend invocation
#[derive(Debug, Clone, PartialEq)]
pub struct BackendStatus {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Tail of the backend's diagnostic output
    pub diagnostics: String,
}

impl BackendStatus {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            diagnostics: String::new(),
        }
    }

    pub fn failed(exit_code: Option<i32>, diagnostics: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            diagnostics: diagnostics.into(),
        }
    }
}

/// Port for the media processing backend
#[async_trait]
pub trait MediaBackendPort: Send + Sync {
    /// Run one trim/transcode job.
    ///
    /// A job that ran but failed returns `Ok` with an unsuccessful status;
    /// `Err` is reserved for jobs that could not be run or timed out.
    async fn run(&self, job: &MediaJob) -> Result<BackendStatus, DomainError>;

    /// Hardware acceleration methods the backend reports on this host
    async fn available_accelerations(&self) -> Result<Vec<String>, DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);

    /// Log structured event
    async fn log_event(&self, event: &LogEvent);
}

/// Log event with structured data
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: std::time::SystemTime,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    /// Create an event stamped with the current time
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: std::time::SystemTime::now(),
            context: BTreeMap::new(),
        }
    }

    /// Attach a context field
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
