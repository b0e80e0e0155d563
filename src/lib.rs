//! Highlight Clipper Library
//!
//! Selects the most interesting parts of a video from its transcript with a
//! two-stage (map-reduce) language model pass, then cuts them into standalone
//! clips concurrently, optionally reflowed to a captioned vertical canvas.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod selection;
pub mod transcript;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{SegmentPlan, TimeSegment, Transcript, TranscriptLine, WindowIndex};
pub use error::{HighlightError, HighlightResult};
