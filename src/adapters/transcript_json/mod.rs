// JSON transcript adapter - reads transcripts exported to local files

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// On-disk transcript shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Lines(Vec<TranscriptLine>),
    Document(Transcript),
}

impl From<TranscriptFile> for Transcript {
    fn from(file: TranscriptFile) -> Self {
        match file {
            TranscriptFile::Lines(lines) => Transcript::from_lines(lines),
            TranscriptFile::Document(transcript) => transcript,
        }
    }
}

/// Transcript source backed by a file or a directory of per-language files.
///
/// In directory mode the file `<video_id>.<lang>.json` is tried for each
/// configured language in order, then `<video_id>.json`.
pub struct TranscriptJsonAdapter {
    source: PathBuf,
    languages: Vec<String>,
}

impl TranscriptJsonAdapter {
    pub fn new(source: impl Into<PathBuf>, languages: Vec<String>) -> Self {
        let languages = if languages.is_empty() {
            SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect()
        } else {
            languages
        };
        Self {
            source: source.into(),
            languages,
        }
    }

    async fn read_transcript(path: &Path) -> Result<Transcript, DomainError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::MetadataUnavailable(format!(
                "Failed to read transcript {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: TranscriptFile = serde_json::from_str(&content).map_err(|e| {
            DomainError::MetadataUnavailable(format!(
                "Malformed transcript {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(file.into())
    }

    async fn locate(&self, video_id: &str) -> Result<(PathBuf, Option<String>), DomainError> {
        for (attempt, language) in self.languages.iter().enumerate() {
            let candidate = self.source.join(format!("{}.{}.json", video_id, language));
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                if attempt > 0 {
                    tracing::info!(
                        video_id,
                        language = language.as_str(),
                        "Transcript found in fallback language"
                    );
                }
                return Ok((candidate, Some(language.clone())));
            }
            tracing::debug!(video_id, language = language.as_str(), "No transcript in language");
        }

        let plain = self.source.join(format!("{}.json", video_id));
        if tokio::fs::try_exists(&plain).await.unwrap_or(false) {
            return Ok((plain, None));
        }

        Err(DomainError::MetadataUnavailable(format!(
            "No transcript for '{}' in {} (languages tried: {})",
            video_id,
            self.source.display(),
            self.languages.join(", ")
        )))
    }
}

#[async_trait]
impl TranscriptPort for TranscriptJsonAdapter {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Transcript, DomainError> {
        let is_dir = tokio::fs::metadata(&self.source)
            .await
            .map(|meta| meta.is_dir())
            .map_err(|e| {
                DomainError::MetadataUnavailable(format!(
                    "Transcript source {} is not accessible: {}",
                    self.source.display(),
                    e
                ))
            })?;

        let (path, language) = if is_dir {
            self.locate(video_id).await?
        } else {
            (self.source.clone(), None)
        };

        let mut transcript = Self::read_transcript(&path).await?;
        if transcript.language.is_none() {
            transcript.language = language;
        }
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_bare_array_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.json");
        std::fs::write(
            &path,
            r#"[{"text":"hi","start":1.5,"duration":2.0},{"text":"there","start":61.0}]"#,
        )
        .unwrap();

        let adapter = TranscriptJsonAdapter::new(&path, vec![]);
        let transcript = adapter.fetch_transcript("ignored").await.unwrap();
        assert_eq!(transcript.lines.len(), 2);
        assert_eq!(transcript.lines[1].duration, 0.0);
        assert!(transcript.title.is_none());
    }

    #[tokio::test]
    async fn test_reads_document_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.json");
        std::fs::write(
            &path,
            r#"{"title":"Match","category":"Sports","duration":1500.0,
                "lines":[{"text":"kickoff","start":0.0,"duration":3.0}]}"#,
        )
        .unwrap();

        let transcript = TranscriptJsonAdapter::new(&path, vec![])
            .fetch_transcript("x")
            .await
            .unwrap();
        assert_eq!(transcript.category.as_deref(), Some("Sports"));
        assert_eq!(transcript.duration, Some(1500.0));
    }

    #[tokio::test]
    async fn test_directory_language_fallback() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("abc.en.json"), r#"[{"text":"hello","start":0.0}]"#)
            .unwrap();

        let adapter = TranscriptJsonAdapter::new(dir.path(), vec!["ko".into(), "en".into()]);
        let transcript = adapter.fetch_transcript("abc").await.unwrap();
        assert_eq!(transcript.language.as_deref(), Some("en"));
        assert_eq!(transcript.lines[0].text, "hello");
    }

    #[tokio::test]
    async fn test_missing_transcript_is_metadata_error() {
        let dir = TempDir::new().unwrap();
        let adapter = TranscriptJsonAdapter::new(dir.path(), vec![]);
        let result = adapter.fetch_transcript("nope").await;
        assert!(matches!(result, Err(DomainError::MetadataUnavailable(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_metadata_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let result = TranscriptJsonAdapter::new(&path, vec![]).fetch_transcript("bad").await;
        assert!(matches!(result, Err(DomainError::MetadataUnavailable(_))));
    }
}
