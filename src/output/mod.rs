//! Published clip management

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::domain::errors::DomainError;

pub mod writer;

pub use writer::ClipPublisher;

/// Prefix shared by every in-progress temp file
pub const TEMP_PREFIX: &str = ".segment_";

/// One clip visible in an output directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedClip {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Temp path of a segment's trim step
pub fn temp_path(output_dir: &Path, ordinal: usize, extension: &str) -> PathBuf {
    output_dir.join(format!("{}{}.part.{}", TEMP_PREFIX, ordinal, extension))
}

/// Temp path of a segment's vertical reflow step
pub fn vertical_temp_path(output_dir: &Path, ordinal: usize, extension: &str) -> PathBuf {
    output_dir.join(format!("{}{}.vertical.part.{}", TEMP_PREFIX, ordinal, extension))
}

fn is_temp_file(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX) || name.starts_with(".caption_")
}

/// Published clips with the given extension, sorted by path
pub fn list_published_clips(
    output_dir: &Path,
    extension: &str,
) -> Result<Vec<PublishedClip>, DomainError> {
    if !output_dir.is_dir() {
        return Err(DomainError::FsFail(format!(
            "Output directory {} does not exist",
            output_dir.display()
        )));
    }

    let mut clips = Vec::new();
    for entry in WalkDir::new(output_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| DomainError::FsFail(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_temp_file(&name) {
            continue;
        }
        let matches_extension = entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches_extension {
            continue;
        }
        let size_bytes = entry
            .metadata()
            .map_err(|e| DomainError::FsFail(e.to_string()))?
            .len();
        clips.push(PublishedClip {
            path: entry.into_path(),
            size_bytes,
        });
    }
    clips.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(clips)
}
