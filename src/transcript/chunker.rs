//! Recursive character splitter for LLM-sized transcript chunks

use std::collections::VecDeque;

use crate::domain::errors::DomainError;

pub const DEFAULT_CHUNK_SIZE: usize = 4000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Splits text into chunks of at most `chunk_size` characters.
///
/// Separators are tried from coarsest to finest (`"\n\n"`, `"\n"`, `" "`,
/// then single characters), so whole windows stay together whenever they
/// fit. Consecutive chunks share up to `chunk_overlap` characters of
/// trailing context.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: default_separators(),
        }
    }
}

fn default_separators() -> Vec<String> {
    ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl TextChunker {
    /// Create a chunker, validating that the overlap is smaller than the chunk
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::BadArgs("Chunk size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(DomainError::BadArgs(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: default_separators(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split text into ordered chunks; blank input gives no chunks
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).map(String::as_str).unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, ch)| &text[i..i + ch.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|piece| !piece.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) <= self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    /// Greedily join pieces into chunks, carrying overlap between them
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { separator_len };

            if total + joiner + len > self.chunk_size && !current.is_empty() {
                push_chunk(&mut chunks, &current, separator);

                while total > self.chunk_overlap
                    || (total > 0 && total + separator_len + len > self.chunk_size)
                {
                    let Some(first) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(first);
                    if !current.is_empty() {
                        total -= separator_len;
                    }
                }
            }

            if !current.is_empty() {
                total += separator_len;
            }
            current.push_back(piece);
            total += len;
        }

        push_chunk(&mut chunks, &current, separator);
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, current: &VecDeque<&str>, separator: &str) {
    let joined = current.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_gives_no_chunks() {
        let chunker = TextChunker::default();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("  \n ").is_empty());
    }

    #[test]
    fn test_small_text_is_one_chunk() {
        let chunker = TextChunker::default();
        let text = "[0] hello\n\n[1] world";
        assert_eq!(chunker.split(text), vec![text.to_string()]);
    }

    #[test]
    fn test_windows_are_not_split_when_they_fit() {
        let chunker = TextChunker::new(16, 0).unwrap();
        let chunks = chunker.split("[0] aaa\n\n[1] bbb\n\n[2] ccc");
        assert_eq!(chunks, vec!["[0] aaa\n\n[1] bbb", "[2] ccc"]);
    }

    #[test]
    fn test_overlap_repeats_trailing_window() {
        let chunker = TextChunker::new(16, 7).unwrap();
        let chunks = chunker.split("[0] aaa\n\n[1] bbb\n\n[2] ccc");
        assert_eq!(chunks, vec!["[0] aaa\n\n[1] bbb", "[1] bbb\n\n[2] ccc"]);
    }

    #[test]
    fn test_oversized_window_falls_back_to_words() {
        let chunker = TextChunker::new(12, 0).unwrap();
        let chunks = chunker.split("[0] one two three four");
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 12));
        assert!(chunks[0].starts_with("[0]"));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let chunker = TextChunker::new(5, 0).unwrap();
        let chunks = chunker.split("가나다 라마바");
        assert_eq!(chunks, vec!["가나다", "라마바"]);
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(TextChunker::new(10, 10).is_err());
        assert!(TextChunker::new(0, 0).is_err());
    }
}
