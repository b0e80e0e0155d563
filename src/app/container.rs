use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    AppConfig, FFmpegAdapter, FFprobeAdapter, OpenAiCompletionAdapter, PromptedSelectionModel,
    TracingLogAdapter, TranscriptJsonAdapter,
};
use crate::app::{
    extract_interactor::ExtractInteractor,
    highlight_interactor::{HighlightInteractor, PipelineSettings},
    inspect_interactor::InspectInteractor,
};
use crate::domain::errors::DomainError;
use crate::engine::{ClipEngine, EngineConfig};
use crate::ports::{
    LogPort, MediaBackendPort, ProbePort, SelectionModelPort, TextCompletionPort, TranscriptPort,
};

pub trait AppContainer: Send + Sync {
    /// Pipeline reading transcripts from a file or directory
    fn highlight_interactor(&self, transcript_source: &Path) -> Arc<HighlightInteractor>;
    fn extract_interactor(&self) -> Arc<ExtractInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    model: Arc<dyn SelectionModelPort>,
    log_port: Arc<dyn LogPort>,
    languages: Vec<String>,
    settings: PipelineSettings,
    extract_interactor: Arc<ExtractInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire production adapters from a validated configuration
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let log_port: Arc<dyn LogPort> = Arc::new(TracingLogAdapter::new(config.log_level()?));
        let completion: Arc<dyn TextCompletionPort> =
            Arc::new(OpenAiCompletionAdapter::new(config.chat_settings())?);
        let model: Arc<dyn SelectionModelPort> = Arc::new(PromptedSelectionModel::new(completion));
        let probe_port: Arc<dyn ProbePort> = Arc::new(FFprobeAdapter::new(
            &config.extraction.ffprobe_path,
            Duration::from_secs(config.extraction.probe_timeout_secs),
        ));
        let backend: Arc<dyn MediaBackendPort> = Arc::new(FFmpegAdapter::new(
            &config.extraction.ffmpeg_path,
            Duration::from_secs(config.extraction.timeout_secs),
        ));

        let settings = PipelineSettings {
            default_category: config.selection.category.clone(),
            chunker: config.chunker()?,
            padding_seconds: config.selection.padding_seconds,
            max_concurrent_requests: config.selection.max_concurrent_requests,
        };

        Ok(Self::from_ports(
            model,
            probe_port,
            backend,
            log_port,
            config.transcript.languages.clone(),
            settings,
            config.engine_config()?,
        ))
    }

    /// Wire the interactors around already-built ports
    pub fn from_ports(
        model: Arc<dyn SelectionModelPort>,
        probe_port: Arc<dyn ProbePort>,
        backend: Arc<dyn MediaBackendPort>,
        log_port: Arc<dyn LogPort>,
        languages: Vec<String>,
        settings: PipelineSettings,
        engine_config: EngineConfig,
    ) -> Self {
        let engine = Arc::new(ClipEngine::new(
            backend,
            Arc::clone(&log_port),
            engine_config,
        ));

        let extract_interactor = Arc::new(ExtractInteractor::new(
            probe_port,
            Arc::clone(&engine),
            Arc::clone(&log_port),
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(
            Arc::clone(&extract_interactor),
            engine,
        ));

        Self {
            model,
            log_port,
            languages,
            settings,
            extract_interactor,
            inspect_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn highlight_interactor(&self, transcript_source: &Path) -> Arc<HighlightInteractor> {
        let transcript_port: Arc<dyn TranscriptPort> = Arc::new(TranscriptJsonAdapter::new(
            transcript_source,
            self.languages.clone(),
        ));
        Arc::new(HighlightInteractor::new(
            transcript_port,
            Arc::clone(&self.model),
            Arc::clone(&self.log_port),
            Arc::clone(&self.extract_interactor),
            self.settings.clone(),
        ))
    }

    fn extract_interactor(&self) -> Arc<ExtractInteractor> {
        Arc::clone(&self.extract_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
