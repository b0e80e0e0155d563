// Domain models - Core types and data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Length of one transcript window in seconds
pub const WINDOW_SECONDS: i64 = 60;

/// Padding added before and after a selected window, in seconds
pub const CLIP_PADDING: i64 = 10;

/// Shortest clip the extraction engine will produce, in seconds
pub const MIN_CLIP_LENGTH: f64 = 10.0;

/// Transcript languages tried in order when fetching a transcript
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["ko", "en"];

/// Category used when neither the caller nor the transcript names one
pub const DEFAULT_CATEGORY: &str = "General";

/// One time-stamped line of a video transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// Display duration in seconds
    #[serde(default)]
    pub duration: f64,
}

impl TranscriptLine {
    /// Create a new transcript line
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End offset of the line in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration.max(0.0)
    }
}

/// Transcript as delivered by a transcript source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub lines: Vec<TranscriptLine>,
    /// Language actually used, when the source reports one
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Total video duration in seconds, when known
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Transcript {
    /// Create a transcript from bare lines
    pub fn from_lines(lines: Vec<TranscriptLine>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// Latest end offset of any line, zero for an empty transcript
    pub fn span_seconds(&self) -> f64 {
        self.lines
            .iter()
            .map(TranscriptLine::end)
            .filter(|end| end.is_finite())
            .fold(0.0, f64::max)
    }

    /// Concatenated text of the lines starting within `[start, end]`
    pub fn text_between(&self, start: f64, end: f64) -> String {
        self.lines
            .iter()
            .filter(|line| line.start >= start && line.start <= end)
            .map(|line| line.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Index of a 60-second transcript window, `floor(start / 60)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowIndex(pub u32);

impl WindowIndex {
    /// Window containing the given offset; negative offsets map to window 0
    pub fn for_offset(seconds: f64) -> Option<Self> {
        if !seconds.is_finite() {
            return None;
        }
        let bucket = (seconds.max(0.0) / WINDOW_SECONDS as f64).floor();
        if bucket > u32::MAX as f64 {
            return None;
        }
        Some(Self(bucket as u32))
    }

    /// Convert a raw model token value, rejecting negatives and overflow
    pub fn from_raw(value: i64) -> Option<Self> {
        u32::try_from(value).ok().map(Self)
    }

    /// Start of the window in seconds
    pub fn start_seconds(&self) -> i64 {
        self.0 as i64 * WINDOW_SECONDS
    }

    /// End of the window in seconds
    pub fn end_seconds(&self) -> i64 {
        (self.0 as i64 + 1) * WINDOW_SECONDS
    }
}

impl fmt::Display for WindowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Metadata the selection pipeline needs about a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: Option<String>,
    pub category: String,
    /// Total duration in seconds
    pub duration_seconds: f64,
    pub language: Option<String>,
}

/// Padded time interval around one selected window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSegment {
    /// Position in the final plan
    pub ordinal: usize,
    pub window: WindowIndex,
    /// Start in seconds, may be negative before clamping
    pub start: i64,
    pub end: i64,
    pub title: Option<String>,
    /// Output file name without extension
    pub file_stem: String,
}

impl TimeSegment {
    /// Create the padded segment around a window
    pub fn around_window(ordinal: usize, window: WindowIndex, padding: i64) -> Self {
        Self {
            ordinal,
            window,
            start: window.start_seconds() - padding,
            end: window.end_seconds() + padding,
            title: None,
            file_stem: Self::default_stem(ordinal),
        }
    }

    /// Ordinal-based file stem
    pub fn default_stem(ordinal: usize) -> String {
        format!("output_{}", ordinal)
    }

    /// Whether the raw range is non-empty
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Output file name for the given container extension
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.file_stem, extension)
    }

    /// Caption burned into vertical clips
    pub fn caption(&self) -> String {
        match &self.title {
            Some(title) if !title.trim().is_empty() => title.trim().to_string(),
            _ => format!("Highlight {}", self.ordinal + 1),
        }
    }
}

/// Ordered segments selected for one video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub category: String,
    pub segments: Vec<TimeSegment>,
}

impl SegmentPlan {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Range actually extracted, clamped against the source duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub start: f64,
    pub end: f64,
}

impl ClipRange {
    /// Clamp a planned segment to `[0, source_duration]`.
    ///
    /// Ranges shorter than `min_length` are extended backward from `end`.
    /// Segments starting at or past the end of the source are rejected.
    pub fn clamp(
        segment: &TimeSegment,
        source_duration: f64,
        min_length: f64,
    ) -> Result<Self, DomainError> {
        if !source_duration.is_finite() || source_duration <= 0.0 {
            return Err(DomainError::InvalidSegment(format!(
                "segment {}: source duration {} is not usable",
                segment.ordinal, source_duration
            )));
        }
        if segment.start as f64 >= source_duration {
            return Err(DomainError::InvalidSegment(format!(
                "segment {}: starts at {}s, source ends at {:.3}s",
                segment.ordinal, segment.start, source_duration
            )));
        }

        let mut start = (segment.start as f64).max(0.0);
        let end = (segment.end as f64).min(source_duration);
        if end - start < min_length {
            start = (end - min_length).max(0.0);
        }
        if end - start <= 0.0 {
            return Err(DomainError::InvalidSegment(format!(
                "segment {}: empty range after clamping ({:.3}s - {:.3}s)",
                segment.ordinal, start, end
            )));
        }

        Ok(Self { start, end })
    }

    /// Length of the range in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for ClipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s - {:.3}s", self.start, self.end)
    }
}
