//! Segment planning: selected windows to padded, named time ranges

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::domain::model::*;
use crate::domain::rules::{NamingRules, SelectionRules};
use crate::ports::{LogPort, SelectionModelPort};

/// Turns selected window indices into a [`SegmentPlan`]
pub struct SegmentPlanner {
    log_port: Arc<dyn LogPort>,
    padding: i64,
    /// Model used for titles; titles are skipped when absent
    title_model: Option<Arc<dyn SelectionModelPort>>,
    max_concurrent_requests: usize,
}

impl SegmentPlanner {
    pub fn new(log_port: Arc<dyn LogPort>, padding: i64) -> Self {
        Self {
            log_port,
            padding,
            title_model: None,
            max_concurrent_requests: 1,
        }
    }

    /// Enable title generation through the given model
    pub fn with_titles(
        mut self,
        model: Arc<dyn SelectionModelPort>,
        max_concurrent_requests: usize,
    ) -> Self {
        self.title_model = Some(model);
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }

    /// Plan segments for `selected`, in selection order.
    ///
    /// Repeated indices are planned once. Segments with an empty range are
    /// dropped with a warning.
    pub async fn plan(
        &self,
        category: &str,
        selected: &[WindowIndex],
        transcript: &Transcript,
    ) -> SegmentPlan {
        let unique = SelectionRules::dedup_preserving_order(selected);
        if unique.len() < selected.len() {
            self.log_port
                .warn(&format!(
                    "Ignoring {} repeated window index(es)",
                    selected.len() - unique.len()
                ))
                .await;
        }

        let mut segments = Vec::with_capacity(unique.len());
        for window in unique {
            let segment = TimeSegment::around_window(segments.len(), window, self.padding);
            if !segment.is_valid() {
                self.log_port
                    .warn(&format!(
                        "Invalid segment for window {}: {}s - {}s; dropped",
                        window, segment.start, segment.end
                    ))
                    .await;
                continue;
            }
            segments.push(segment);
        }

        if let Some(model) = &self.title_model {
            self.assign_titles(model, category, transcript, &mut segments)
                .await;
        }
        NamingRules::assign_file_stems(&mut segments);

        SegmentPlan {
            category: category.to_string(),
            segments,
        }
    }

    async fn assign_titles(
        &self,
        model: &Arc<dyn SelectionModelPort>,
        category: &str,
        transcript: &Transcript,
        segments: &mut [TimeSegment],
    ) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));
        let handles: Vec<_> = segments
            .iter()
            .map(|segment| {
                let text = transcript.text_between(segment.start as f64, segment.end as f64);
                let model = Arc::clone(model);
                let semaphore = Arc::clone(&semaphore);
                let category = category.to_string();
                tokio::spawn(async move {
                    if text.is_empty() {
                        return None;
                    }
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    Some(model.title(&category, &text).await)
                })
            })
            .collect();

        for (segment, handle) in segments.iter_mut().zip(handles) {
            match handle.await {
                Ok(Some(Ok(title))) => segment.title = Some(title),
                Ok(Some(Err(e))) => {
                    self.log_port
                        .warn(&format!(
                            "Title for segment {} unavailable, using ordinal name: {}",
                            segment.ordinal, e
                        ))
                        .await
                }
                Ok(None) => {
                    self.log_port
                        .debug(&format!("Segment {} has no transcript text", segment.ordinal))
                        .await
                }
                Err(e) => {
                    self.log_port
                        .warn(&format!("Title task for segment {} failed: {}", segment.ordinal, e))
                        .await
                }
            }
        }
    }
}
