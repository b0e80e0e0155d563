// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod llm_openai;
pub mod probe_ffprobe;
pub mod prompted_model;
pub mod toml_config;
pub mod tracing_log;
pub mod transcript_json;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use llm_openai::OpenAiCompletionAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use prompted_model::PromptedSelectionModel;
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use tracing_log::TracingLogAdapter;
pub use transcript_json::TranscriptJsonAdapter;
