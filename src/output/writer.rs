//! Atomic clip publishing

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::output::TEMP_PREFIX;
use crate::ports::LogPort;

/// Moves finished temp files to their final names
#[derive(Clone)]
pub struct ClipPublisher {
    log_port: Arc<dyn LogPort>,
}

impl ClipPublisher {
    pub fn new(log_port: Arc<dyn LogPort>) -> Self {
        Self { log_port }
    }

    /// Publish `temp` as `final_path`.
    ///
    /// A stale file at `final_path` is removed first. Rename is used when
    /// possible; across devices the file is copied next to `final_path` and
    /// renamed into place.
    pub async fn publish(&self, temp: &Path, final_path: &Path) -> Result<PathBuf, DomainError> {
        if !tokio::fs::try_exists(temp).await.unwrap_or(false) {
            return Err(DomainError::ExtractionFailure(format!(
                "Expected output {} was not produced",
                temp.display()
            )));
        }

        match tokio::fs::remove_file(final_path).await {
            Ok(()) => {
                self.log_port
                    .debug(&format!("Removed stale clip {}", final_path.display()))
                    .await
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DomainError::FsFail(format!(
                    "Failed to remove stale clip {}: {}",
                    final_path.display(),
                    e
                )))
            }
        }

        if let Err(rename_err) = tokio::fs::rename(temp, final_path).await {
            self.log_port
                .debug(&format!(
                    "Rename {} -> {} failed ({}); copying instead",
                    temp.display(),
                    final_path.display(),
                    rename_err
                ))
                .await;
            self.copy_into_place(temp, final_path).await?;
        }

        Ok(final_path.to_path_buf())
    }

    /// Copy `temp` to a hidden sibling of `final_path`, then rename it over.
    ///
    /// `final_path` never holds a partially copied file.
    pub async fn copy_into_place(&self, temp: &Path, final_path: &Path) -> Result<(), DomainError> {
        let staging = staging_path(final_path);
        let copied = match tokio::fs::copy(temp, &staging).await {
            Ok(_) => tokio::fs::rename(&staging, final_path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = copied {
            self.discard(&staging).await;
            return Err(DomainError::FsFail(format!(
                "Failed to publish {}: {}",
                final_path.display(),
                e
            )));
        }
        self.discard(temp).await;
        Ok(())
    }

    /// Remove a temp file if present
    pub async fn discard(&self, temp: &Path) {
        match tokio::fs::remove_file(temp).await {
            Ok(()) => {
                self.log_port
                    .debug(&format!("Removed temp file {}", temp.display()))
                    .await
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                self.log_port
                    .warn(&format!("Failed to remove temp file {}: {}", temp.display(), e))
                    .await
            }
        }
    }
}

/// Hidden name next to `final_path` used while copying
fn staging_path(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    final_path.with_file_name(format!("{}publish_{}.part", TEMP_PREFIX, name))
}
