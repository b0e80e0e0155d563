// Domain rules - Business logic and policies

use std::collections::HashSet;
use std::hash::Hash;

use crate::domain::model::*;

/// Videos shorter than this many minutes get the small target count
const LONG_VIDEO_MINUTES: f64 = 20.0;

const SHORT_VIDEO_TARGET: usize = 3;
const LONG_VIDEO_TARGET: usize = 5;

/// Longest file stem derived from a generated title, in characters
const MAX_STEM_CHARS: usize = 80;

/// Business rules for bounding the highlight selection
pub struct SelectionRules;

impl SelectionRules {
    /// Maximum number of highlight segments for a video of the given length
    pub fn target_count(duration_seconds: f64) -> usize {
        if duration_seconds / 60.0 < LONG_VIDEO_MINUTES {
            SHORT_VIDEO_TARGET
        } else {
            LONG_VIDEO_TARGET
        }
    }

    /// Whether the reduce request can be skipped for this many candidates
    pub fn reduce_needed(candidate_count: usize, target_count: usize) -> bool {
        candidate_count > target_count
    }

    /// Remove repeated entries, keeping the first occurrence of each
    pub fn dedup_preserving_order<T: Copy + Eq + Hash>(items: &[T]) -> Vec<T> {
        let mut seen = HashSet::with_capacity(items.len());
        items.iter().copied().filter(|item| seen.insert(*item)).collect()
    }
}

/// Business rules for output file naming
pub struct NamingRules;

impl NamingRules {
    /// Turn a generated title into a file stem.
    ///
    /// Alphanumeric characters (any script) are kept, runs of whitespace,
    /// dashes and underscores collapse to one `_`, everything else is dropped.
    pub fn sanitize_title(title: &str) -> Option<String> {
        let mut stem = String::with_capacity(title.len());
        let mut pending_separator = false;

        for ch in title.chars() {
            if ch.is_alphanumeric() {
                if pending_separator && !stem.is_empty() {
                    stem.push('_');
                }
                pending_separator = false;
                stem.push(ch);
            } else if ch.is_whitespace() || ch == '-' || ch == '_' {
                pending_separator = true;
            }
        }

        let stem: String = stem.chars().take(MAX_STEM_CHARS).collect();
        let stem = stem.trim_end_matches('_').to_string();
        if stem.is_empty() {
            None
        } else {
            Some(stem)
        }
    }

    /// Assign file stems to segments: sanitized titles where available,
    /// ordinal names otherwise, with collisions disambiguated by ordinal
    /// (then a counter) until every stem is unique.
    pub fn assign_file_stems(segments: &mut [TimeSegment]) {
        let mut used = HashSet::new();
        for segment in segments.iter_mut() {
            let mut stem = segment
                .title
                .as_deref()
                .and_then(Self::sanitize_title)
                .unwrap_or_else(|| TimeSegment::default_stem(segment.ordinal));

            // Collisions are checked case-insensitively.
            if used.contains(&stem.to_lowercase()) {
                let base = format!("{}_{}", stem, segment.ordinal);
                stem = base.clone();
                let mut attempt = 1;
                while used.contains(&stem.to_lowercase()) {
                    stem = format!("{}_{}", base, attempt);
                    attempt += 1;
                }
            }
            used.insert(stem.to_lowercase());
            segment.file_stem = stem;
        }
    }
}
