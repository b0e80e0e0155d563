//! Transcript grouping into fixed-length windows
//!
//! Every transcript line is assigned to the 60-second window containing its
//! start offset. The labeled rendering (`[k] text`, windows separated by a
//! blank line) is the only form of the transcript the language model sees,
//! so labels are always parseable back into a [`WindowIndex`].

use std::collections::HashMap;

use crate::domain::model::{TranscriptLine, WindowIndex};

pub mod chunker;

pub use chunker::TextChunker;

/// Separator between rendered windows
pub const WINDOW_SEPARATOR: &str = "\n\n";

/// Transcript text of one 60-second window
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    index: WindowIndex,
    text: String,
}

impl Window {
    pub fn index(&self) -> WindowIndex {
        self.index
    }

    /// Space-joined text of the window's lines
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `[k] text` rendering used in prompts
    pub fn labeled(&self) -> String {
        if self.text.is_empty() {
            self.index.to_string()
        } else {
            format!("{} {}", self.index, self.text)
        }
    }
}

/// Windows of one transcript, keyed by index in first-appearance order
#[derive(Debug, Clone, Default)]
pub struct TranscriptWindows {
    windows: Vec<Window>,
    positions: HashMap<WindowIndex, usize>,
}

impl TranscriptWindows {
    /// Group transcript lines into windows.
    ///
    /// Lines with a non-finite start are skipped. An empty transcript gives
    /// an empty container.
    pub fn group(lines: &[TranscriptLine]) -> Self {
        let mut pieces: Vec<(WindowIndex, Vec<String>)> = Vec::new();
        let mut positions = HashMap::new();

        for line in lines {
            let Some(index) = WindowIndex::for_offset(line.start) else {
                continue;
            };
            let position = *positions.entry(index).or_insert_with(|| {
                pieces.push((index, Vec::new()));
                pieces.len() - 1
            });

            // Embedded newlines would read as window separators downstream.
            let text = line.text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                pieces[position].1.push(text);
            }
        }

        let windows = pieces
            .into_iter()
            .map(|(index, texts)| Window {
                index,
                text: texts.join(" "),
            })
            .collect();

        Self { windows, positions }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn get(&self, index: WindowIndex) -> Option<&Window> {
        self.positions.get(&index).map(|&position| &self.windows[position])
    }

    pub fn contains(&self, index: WindowIndex) -> bool {
        self.positions.contains_key(&index)
    }

    /// Windows in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter()
    }

    /// Render every window, blank-line separated
    pub fn labeled_text(&self) -> String {
        self.windows
            .iter()
            .map(Window::labeled)
            .collect::<Vec<_>>()
            .join(WINDOW_SEPARATOR)
    }

    /// Render the given windows in the given order, skipping unknown indices
    pub fn labeled_subset(&self, indices: &[WindowIndex]) -> String {
        indices
            .iter()
            .filter_map(|&index| self.get(index))
            .map(Window::labeled)
            .collect::<Vec<_>>()
            .join(WINDOW_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, start: f64) -> TranscriptLine {
        TranscriptLine::new(text, start, 2.0)
    }

    #[test]
    fn test_group_buckets_by_minute() {
        let windows = TranscriptWindows::group(&[
            line("hello", 1.0),
            line("there", 30.0),
            line("next", 61.0),
            line("much later", 185.0),
        ]);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows.get(WindowIndex(0)).unwrap().text(), "hello there");
        assert_eq!(windows.get(WindowIndex(1)).unwrap().text(), "next");
        assert_eq!(windows.get(WindowIndex(3)).unwrap().text(), "much later");
        assert!(!windows.contains(WindowIndex(2)));
    }

    #[test]
    fn test_labeled_text() {
        let windows = TranscriptWindows::group(&[line("a", 0.0), line("b", 70.0)]);
        assert_eq!(windows.labeled_text(), "[0] a\n\n[1] b");
    }

    #[test]
    fn test_first_appearance_order_is_kept() {
        let windows = TranscriptWindows::group(&[
            line("late", 130.0),
            line("early", 10.0),
            line("late again", 150.0),
        ]);
        let order: Vec<u32> = windows.iter().map(|w| w.index().0).collect();
        assert_eq!(order, vec![2, 0]);
        assert_eq!(windows.get(WindowIndex(2)).unwrap().text(), "late late again");
    }

    #[test]
    fn test_newlines_are_flattened() {
        let windows = TranscriptWindows::group(&[line("one\n\ntwo", 0.0)]);
        assert_eq!(windows.labeled_text(), "[0] one two");
    }

    #[test]
    fn test_empty_transcript() {
        let windows = TranscriptWindows::group(&[]);
        assert!(windows.is_empty());
        assert_eq!(windows.labeled_text(), "");
    }

    #[test]
    fn test_skips_non_finite_start() {
        let windows = TranscriptWindows::group(&[line("bad", f64::NAN), line("good", 5.0)]);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows.labeled_text(), "[0] good");
    }

    #[test]
    fn test_labeled_subset_skips_unknown() {
        let windows = TranscriptWindows::group(&[line("a", 0.0), line("b", 70.0)]);
        let text = windows.labeled_subset(&[WindowIndex(1), WindowIndex(9), WindowIndex(0)]);
        assert_eq!(text, "[1] b\n\n[0] a");
    }
}
