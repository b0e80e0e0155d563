//! Integration tests for transcript selection, planning and the full pipeline

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use highlight_clipper::adapters::PromptedSelectionModel;
use highlight_clipper::app::container::{AppContainer, DefaultAppContainer};
use highlight_clipper::app::{PipelineSettings, RunRequest, SelectRequest};
use highlight_clipper::domain::errors::DomainError;
use highlight_clipper::domain::model::{TranscriptLine, WindowIndex};
use highlight_clipper::engine::{AccelerationMode, EngineConfig};
use highlight_clipper::ports::{
    BackendStatus, LogEvent, LogPort, MediaBackendPort, MediaJob, ProbePort, SelectionModelPort,
    TextCompletionPort,
};
use highlight_clipper::selection::MapReduceSelector;
use highlight_clipper::transcript::{TextChunker, TranscriptWindows};

// Test utilities

struct NullLog;

#[async_trait]
impl LogPort for NullLog {
    async fn info(&self, _message: &str) {}
    async fn warn(&self, _message: &str) {}
    async fn error(&self, _message: &str) {}
    async fn debug(&self, _message: &str) {}
    async fn log_event(&self, _event: &LogEvent) {}
}

type NominateFn = dyn Fn(&str) -> Result<Vec<WindowIndex>, DomainError> + Send + Sync;

/// Selection model answering from fixed scripts and counting calls
struct ScriptedModel {
    nominate: Box<NominateFn>,
    condense: Result<Vec<u32>, DomainError>,
    titles: Vec<String>,
    nominate_calls: AtomicUsize,
    condense_calls: AtomicUsize,
    condense_targets: Mutex<Vec<usize>>,
    title_calls: AtomicUsize,
}

impl ScriptedModel {
    fn nominating(indices: &[u32]) -> Self {
        let indices: Vec<WindowIndex> = indices.iter().copied().map(WindowIndex).collect();
        Self::with(move |_| Ok(indices.clone()))
    }

    fn with<F>(nominate: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<WindowIndex>, DomainError> + Send + Sync + 'static,
    {
        Self {
            nominate: Box::new(nominate),
            condense: Ok(Vec::new()),
            titles: Vec::new(),
            nominate_calls: AtomicUsize::new(0),
            condense_calls: AtomicUsize::new(0),
            condense_targets: Mutex::new(Vec::new()),
            title_calls: AtomicUsize::new(0),
        }
    }

    fn condensing(mut self, indices: &[u32]) -> Self {
        self.condense = Ok(indices.to_vec());
        self
    }

    fn condense_failing(mut self, err: DomainError) -> Self {
        self.condense = Err(err);
        self
    }

    fn titled(mut self, titles: &[&str]) -> Self {
        self.titles = titles.iter().map(|t| t.to_string()).collect();
        self
    }

    fn total_calls(&self) -> usize {
        self.nominate_calls.load(Ordering::SeqCst)
            + self.condense_calls.load(Ordering::SeqCst)
            + self.title_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SelectionModelPort for ScriptedModel {
    async fn nominate(&self, _category: &str, chunk: &str) -> Result<Vec<WindowIndex>, DomainError> {
        self.nominate_calls.fetch_add(1, Ordering::SeqCst);
        (self.nominate)(chunk)
    }

    async fn condense(
        &self,
        _category: &str,
        _candidates_text: &str,
        target_count: usize,
    ) -> Result<Vec<WindowIndex>, DomainError> {
        self.condense_calls.fetch_add(1, Ordering::SeqCst);
        self.condense_targets.lock().unwrap().push(target_count);
        self.condense
            .clone()
            .map(|indices| indices.into_iter().map(WindowIndex).collect())
    }

    async fn title(&self, _category: &str, segment_text: &str) -> Result<String, DomainError> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        // Titles are keyed by the first window label present in the text.
        let position = (0..self.titles.len())
            .find(|i| segment_text.contains(&format!("minute {}", i)))
            .unwrap_or(0);
        self.titles
            .get(position)
            .cloned()
            .ok_or_else(|| DomainError::ModelUnavailable("no title scripted".to_string()))
    }
}

/// Completion service that always answers with the same text
struct FixedCompletion(&'static str);

#[async_trait]
impl TextCompletionPort for FixedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, DomainError> {
        Ok(self.0.to_string())
    }
}

struct FixedProbe(Result<f64, DomainError>);

#[async_trait]
impl ProbePort for FixedProbe {
    async fn probe_duration(&self, _file_path: &str) -> Result<f64, DomainError> {
        self.0.clone()
    }
}

/// Backend that writes the job's seek offset as the clip content
struct WritingBackend;

#[async_trait]
impl MediaBackendPort for WritingBackend {
    async fn run(&self, job: &MediaJob) -> Result<BackendStatus, DomainError> {
        std::fs::write(&job.output, format!("{:?}-{:?}", job.start, job.duration)).unwrap();
        Ok(BackendStatus::succeeded())
    }

    async fn available_accelerations(&self) -> Result<Vec<String>, DomainError> {
        Ok(Vec::new())
    }
}

/// One line per minute, text `minute k`
fn minutes(count: u32) -> Vec<TranscriptLine> {
    (0..count)
        .map(|k| TranscriptLine::new(format!("minute {}", k), k as f64 * 60.0 + 5.0, 4.0))
        .collect()
}

fn selector(model: Arc<ScriptedModel>, chunker: TextChunker) -> MapReduceSelector {
    MapReduceSelector::new(model, Arc::new(NullLog), chunker, 4)
}

fn write_transcript(dir: &Path, name: &str, lines: &[TranscriptLine]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(lines).unwrap()).unwrap();
    path
}

fn container(model: Arc<ScriptedModel>, probe: FixedProbe) -> DefaultAppContainer {
    DefaultAppContainer::from_ports(
        model,
        Arc::new(probe),
        Arc::new(WritingBackend),
        Arc::new(NullLog),
        Vec::new(),
        PipelineSettings::default(),
        EngineConfig {
            max_parallel: 2,
            acceleration: AccelerationMode::Disabled,
            ..EngineConfig::default()
        },
    )
}

// Selection

#[tokio::test]
async fn test_not_found_marker_is_dropped_from_model_output() {
    let completion: Arc<dyn TextCompletionPort> = Arc::new(FixedCompletion("-1, 3"));
    let model = Arc::new(PromptedSelectionModel::new(completion));
    let selector = MapReduceSelector::new(model, Arc::new(NullLog), TextChunker::default(), 2);

    let windows = TranscriptWindows::group(&minutes(5));
    let selection = selector.select("Sports", &windows, 300.0).await.unwrap();

    assert_eq!(selection.selected, vec![WindowIndex(3)]);
    assert!(!selection.reduced);
}

#[tokio::test]
async fn test_small_candidate_set_skips_reduce_and_keeps_order() {
    let model = Arc::new(ScriptedModel::nominating(&[4, 2]));
    let windows = TranscriptWindows::group(&minutes(10));

    let selection = selector(Arc::clone(&model), TextChunker::default())
        .select("News", &windows, 600.0)
        .await
        .unwrap();

    assert_eq!(selection.target_count, 3);
    assert_eq!(selection.selected, vec![WindowIndex(4), WindowIndex(2)]);
    assert!(!selection.reduced);
    assert_eq!(model.condense_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_long_video_reduces_and_truncates_to_target() {
    let model = Arc::new(
        ScriptedModel::nominating(&[1, 3, 5, 7, 9, 11, 13, 15]).condensing(&[15, 13, 11, 9, 7, 5, 3]),
    );
    let windows = TranscriptWindows::group(&minutes(25));

    let selection = selector(Arc::clone(&model), TextChunker::default())
        .select("Sports", &windows, 25.0 * 60.0)
        .await
        .unwrap();

    assert_eq!(selection.target_count, 5);
    assert_eq!(selection.candidates.len(), 8);
    assert!(selection.reduced);
    assert_eq!(
        selection.selected,
        [15, 13, 11, 9, 7].into_iter().map(WindowIndex).collect::<Vec<_>>()
    );
    assert_eq!(*model.condense_targets.lock().unwrap(), vec![5]);
}

#[tokio::test]
async fn test_reduce_parse_error_aborts_selection() {
    let model = Arc::new(
        ScriptedModel::nominating(&[1, 3, 5, 7, 9, 11, 13, 15])
            .condense_failing(DomainError::SelectionParse("not a list".to_string())),
    );
    let windows = TranscriptWindows::group(&minutes(25));

    let result = selector(Arc::clone(&model), TextChunker::default())
        .select("Sports", &windows, 25.0 * 60.0)
        .await;

    assert!(matches!(result, Err(DomainError::SelectionParse(_))));
    assert_eq!(model.condense_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reduce_naming_no_known_window_is_fatal() {
    let model = Arc::new(ScriptedModel::nominating(&[1, 3, 5, 7, 9, 11, 13, 15]).condensing(&[90, 91]));
    let windows = TranscriptWindows::group(&minutes(25));

    let result = selector(model, TextChunker::default())
        .select("Sports", &windows, 25.0 * 60.0)
        .await;
    assert!(matches!(result, Err(DomainError::SelectionParse(_))));
}

#[tokio::test]
async fn test_reduce_not_found_reply_is_fatal() {
    let model = Arc::new(ScriptedModel::nominating(&[1, 3, 5, 7, 9, 11, 13, 15]).condensing(&[]));
    let windows = TranscriptWindows::group(&minutes(25));

    let result = selector(model, TextChunker::default())
        .select("Sports", &windows, 25.0 * 60.0)
        .await;
    assert!(matches!(result, Err(DomainError::SelectionParse(_))));
}

#[tokio::test]
async fn test_unparseable_chunk_degrades_without_failing() {
    // Each window lands in its own chunk; the chunk holding window 0 is garbage.
    let model = Arc::new(ScriptedModel::with(|chunk| {
        if chunk.contains("[0]") {
            return Err(DomainError::SelectionParse("not a list".to_string()));
        }
        Ok((0..4)
            .map(WindowIndex)
            .filter(|w| chunk.contains(&w.to_string()))
            .collect())
    }));
    let windows = TranscriptWindows::group(&minutes(4));

    let selection = selector(Arc::clone(&model), TextChunker::new(20, 0).unwrap())
        .select("Sports", &windows, 240.0)
        .await
        .unwrap();

    assert!(selection.chunk_count >= 4);
    assert!(selection.degraded_chunks >= 1);
    assert_eq!(
        selection.selected,
        vec![WindowIndex(1), WindowIndex(2), WindowIndex(3)]
    );
}

#[tokio::test]
async fn test_model_outage_aborts_selection() {
    let model = Arc::new(ScriptedModel::with(|_| {
        Err(DomainError::ModelUnavailable("HTTP 503".to_string()))
    }));
    let windows = TranscriptWindows::group(&minutes(3));

    let result = selector(model, TextChunker::default())
        .select("Sports", &windows, 180.0)
        .await;
    assert!(matches!(result, Err(DomainError::ModelUnavailable(_))));
}

#[tokio::test]
async fn test_indices_without_window_are_dropped() {
    let model = Arc::new(ScriptedModel::nominating(&[3, 99, 3]));
    let windows = TranscriptWindows::group(&minutes(5));

    let selection = selector(model, TextChunker::default())
        .select("Sports", &windows, 300.0)
        .await
        .unwrap();
    assert_eq!(selection.candidates, vec![WindowIndex(3)]);
}

// Interactors

#[tokio::test]
async fn test_empty_transcript_plans_nothing_without_model_calls() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path(), "empty.json", &[]);
    let model = Arc::new(ScriptedModel::nominating(&[0]));
    let container = container(Arc::clone(&model), FixedProbe(Ok(60.0)));

    let outcome = container
        .highlight_interactor(&transcript)
        .select(&SelectRequest {
            video_id: "empty".to_string(),
            ..SelectRequest::default()
        })
        .await
        .unwrap();

    assert!(outcome.plan.is_empty());
    assert!(outcome.selection.selected.is_empty());
    assert_eq!(model.total_calls(), 0);
}

#[tokio::test]
async fn test_select_honors_category_and_duration_overrides() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path(), "match.json", &minutes(3));
    let model = Arc::new(ScriptedModel::nominating(&[1]));
    let container = container(model, FixedProbe(Ok(180.0)));

    let outcome = container
        .highlight_interactor(&transcript)
        .select(&SelectRequest {
            video_id: "match".to_string(),
            category: Some("Esports".to_string()),
            duration_seconds: Some(3600.0),
            titles: false,
        })
        .await
        .unwrap();

    assert_eq!(outcome.metadata.category, "Esports");
    assert_eq!(outcome.selection.target_count, 5);
    assert_eq!(outcome.plan.category, "Esports");
    assert_eq!(outcome.plan.segments[0].start, 50);
    assert_eq!(outcome.plan.segments[0].end, 130);
}

#[tokio::test]
async fn test_full_run_publishes_titled_clips() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path(), "match.json", &minutes(3));
    let source = dir.path().join("match.mp4");
    std::fs::write(&source, b"video").unwrap();
    let output_dir = dir.path().join("clips");

    let model = Arc::new(ScriptedModel::nominating(&[0, 2]).titled(&["Opening Goal", "x", "Opening goal!"]));
    let container = container(Arc::clone(&model), FixedProbe(Ok(150.0)));

    let report = container
        .highlight_interactor(&transcript)
        .run(&RunRequest {
            select: SelectRequest {
                video_id: "match".to_string(),
                titles: true,
                ..SelectRequest::default()
            },
            source: source.clone(),
            output_dir: output_dir.clone(),
        })
        .await
        .unwrap();

    assert_eq!(report.source_duration, 150.0);
    let stems: Vec<_> = report.plan.segments.iter().map(|s| s.file_stem.as_str()).collect();
    assert_eq!(stems, vec!["Opening_Goal", "Opening_goal_1"]);

    assert!(report.extraction.all_published());
    let first = report.extraction.outcomes[0].range.unwrap();
    assert_eq!((first.start, first.end), (0.0, 70.0));
    let second = report.extraction.outcomes[1].range.unwrap();
    assert_eq!((second.start, second.end), (110.0, 150.0));
    assert!(output_dir.join("Opening_Goal.mp4").is_file());
    assert!(output_dir.join("Opening_goal_1.mp4").is_file());
}

#[tokio::test]
async fn test_run_fails_when_source_cannot_be_probed() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path(), "match.json", &minutes(3));
    let source = dir.path().join("match.mp4");
    std::fs::write(&source, b"video").unwrap();

    let container = container(
        Arc::new(ScriptedModel::nominating(&[1])),
        FixedProbe(Err(DomainError::MetadataUnavailable("no duration".to_string()))),
    );

    let result = container
        .highlight_interactor(&transcript)
        .run(&RunRequest {
            select: SelectRequest {
                video_id: "match".to_string(),
                ..SelectRequest::default()
            },
            source,
            output_dir: dir.path().join("clips"),
        })
        .await;

    assert!(matches!(result, Err(DomainError::MetadataUnavailable(_))));
    assert!(!dir.path().join("clips").exists());
}

#[tokio::test]
async fn test_run_publishes_nothing_when_reduce_fails() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path(), "match.json", &minutes(25));
    let source = dir.path().join("match.mp4");
    std::fs::write(&source, b"video").unwrap();
    let output_dir = dir.path().join("clips");

    let model = Arc::new(
        ScriptedModel::nominating(&[1, 3, 5, 7, 9, 11, 13, 15])
            .condense_failing(DomainError::SelectionParse("no indices".to_string())),
    );
    let container = container(model, FixedProbe(Ok(1500.0)));

    let result = container
        .highlight_interactor(&transcript)
        .run(&RunRequest {
            select: SelectRequest {
                video_id: "match".to_string(),
                duration_seconds: Some(1500.0),
                ..SelectRequest::default()
            },
            source,
            output_dir: output_dir.clone(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::SelectionParse(_))));
    assert!(!output_dir.exists());
}
