//! Map-Reduce highlight selection
//!
//! The map phase asks the model to nominate window labels from every chunk
//! of the labeled transcript; the reduce phase bounds the aggregated
//! candidates to the duration-derived target count. Reduce is skipped when
//! there are already few enough candidates.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;

use crate::domain::errors::DomainError;
use crate::domain::model::WindowIndex;
use crate::domain::rules::SelectionRules;
use crate::ports::{LogEvent, LogLevel, LogPort, SelectionModelPort};
use crate::transcript::{TextChunker, TranscriptWindows};

/// Outcome of one selection run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Deduplicated map-phase candidates in nomination order
    pub candidates: Vec<WindowIndex>,
    /// Final indices, at most `target_count`
    pub selected: Vec<WindowIndex>,
    pub target_count: usize,
    /// Whether the reduce request was issued
    pub reduced: bool,
    pub chunk_count: usize,
    /// Chunks whose map output could not be parsed
    pub degraded_chunks: usize,
}

impl Selection {
    fn empty(target_count: usize) -> Self {
        Self {
            candidates: Vec::new(),
            selected: Vec::new(),
            target_count,
            reduced: false,
            chunk_count: 0,
            degraded_chunks: 0,
        }
    }
}

/// Two-stage model-backed selector
pub struct MapReduceSelector {
    model: Arc<dyn SelectionModelPort>,
    log_port: Arc<dyn LogPort>,
    chunker: TextChunker,
    max_concurrent_requests: usize,
}

impl MapReduceSelector {
    /// Create new selector with injected ports
    pub fn new(
        model: Arc<dyn SelectionModelPort>,
        log_port: Arc<dyn LogPort>,
        chunker: TextChunker,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            model,
            log_port,
            chunker,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Select highlight windows for a video of the given duration
    pub async fn select(
        &self,
        category: &str,
        windows: &TranscriptWindows,
        duration_seconds: f64,
    ) -> Result<Selection, DomainError> {
        let target_count = SelectionRules::target_count(duration_seconds);

        if windows.is_empty() {
            self.log_port
                .warn("Transcript has no windows; nothing to select")
                .await;
            return Ok(Selection::empty(target_count));
        }

        let chunks = self.chunker.split(&windows.labeled_text());
        let chunk_count = chunks.len();
        let (nominated, degraded_chunks) = self.map_phase(category, chunks).await?;

        let known = self.retain_known(nominated, windows, "map").await;
        let candidates = SelectionRules::dedup_preserving_order(&known);

        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Info, "Map phase complete")
                    .with("chunks", chunk_count)
                    .with("degraded_chunks", degraded_chunks)
                    .with("candidates", format_indices(&candidates))
                    .with("target_count", target_count),
            )
            .await;

        if !SelectionRules::reduce_needed(candidates.len(), target_count) {
            self.log_port
                .info(&format!(
                    "{} candidate(s) within target of {}; skipping reduce",
                    candidates.len(),
                    target_count
                ))
                .await;
            return Ok(Selection {
                selected: candidates.clone(),
                candidates,
                target_count,
                reduced: false,
                chunk_count,
                degraded_chunks,
            });
        }

        let selected = self
            .reduce_phase(category, windows, &candidates, target_count)
            .await?;

        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Info, "Reduce phase complete")
                    .with("selected", format_indices(&selected))
                    .with("target_count", target_count),
            )
            .await;

        Ok(Selection {
            candidates,
            selected,
            target_count,
            reduced: true,
            chunk_count,
            degraded_chunks,
        })
    }

    /// Nominate candidates from every chunk concurrently.
    ///
    /// Results are gathered in chunk order. Unparseable output degrades the
    /// chunk to no candidates; any other model error aborts the phase.
    async fn map_phase(
        &self,
        category: &str,
        chunks: Vec<String>,
    ) -> Result<(Vec<WindowIndex>, usize), DomainError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let model = Arc::clone(&self.model);
                let semaphore = Arc::clone(&semaphore);
                let category = category.to_string();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|e| {
                        DomainError::ModelUnavailable(format!("request limiter closed: {}", e))
                    })?;
                    model.nominate(&category, &chunk).await
                })
            })
            .collect();

        let mut nominated = Vec::new();
        let mut degraded = 0;
        let mut pending = handles.into_iter().enumerate();
        while let Some((chunk_index, handle)) = pending.next() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(DomainError::ModelUnavailable(format!(
                    "map request for chunk {} did not complete: {}",
                    chunk_index, e
                ))),
            };

            match result {
                Ok(indices) => nominated.extend(indices),
                Err(err) if err.is_recoverable_in_map() => {
                    degraded += 1;
                    self.log_port
                        .log_event(
                            &LogEvent::new(LogLevel::Warn, "Map output ignored")
                                .with("chunk", chunk_index)
                                .with("reason", &err),
                        )
                        .await;
                }
                Err(err) => {
                    for (_, remaining) in pending {
                        remaining.abort();
                    }
                    return Err(err);
                }
            }
        }

        Ok((nominated, degraded))
    }

    async fn reduce_phase(
        &self,
        category: &str,
        windows: &TranscriptWindows,
        candidates: &[WindowIndex],
        target_count: usize,
    ) -> Result<Vec<WindowIndex>, DomainError> {
        let candidates_text = windows.labeled_subset(candidates);
        self.log_port
            .info(&format!(
                "Reducing {} candidates to at most {}",
                candidates.len(),
                target_count
            ))
            .await;

        let condensed = self
            .model
            .condense(category, &candidates_text, target_count)
            .await?;

        let known = self.retain_known(condensed, windows, "reduce").await;
        let mut selected = SelectionRules::dedup_preserving_order(&known);
        if selected.is_empty() {
            return Err(DomainError::SelectionParse(format!(
                "reduce output named none of the {} candidate windows",
                candidates.len()
            )));
        }
        if selected.len() > target_count {
            self.log_port
                .warn(&format!(
                    "Reduce returned {} windows; keeping the first {}",
                    selected.len(),
                    target_count
                ))
                .await;
            selected.truncate(target_count);
        }
        Ok(selected)
    }

    /// Drop indices that name no window of this transcript
    async fn retain_known(
        &self,
        indices: Vec<WindowIndex>,
        windows: &TranscriptWindows,
        phase: &str,
    ) -> Vec<WindowIndex> {
        let (known, unknown): (Vec<_>, Vec<_>) =
            indices.into_iter().partition(|&index| windows.contains(index));
        if !unknown.is_empty() {
            self.log_port
                .warn(&format!(
                    "Dropping {} index(es) from {} output with no matching window: {}",
                    unknown.len(),
                    phase,
                    format_indices(&unknown)
                ))
                .await;
        }
        known
    }
}

fn format_indices(indices: &[WindowIndex]) -> String {
    indices
        .iter()
        .map(|index| index.0.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
