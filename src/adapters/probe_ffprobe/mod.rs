//! FFprobe adapter for media file probing

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::domain::errors::*;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -show_entries format=duration -of json` output
pub fn parse_duration(stdout: &str) -> Result<f64, DomainError> {
    let output: ProbeOutput = serde_json::from_str(stdout).map_err(|e| {
        DomainError::MetadataUnavailable(format!("Unreadable ffprobe output: {}", e))
    })?;
    let duration = output
        .format
        .and_then(|format| format.duration)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .ok_or_else(|| {
            DomainError::MetadataUnavailable("ffprobe reported no duration".to_string())
        })?;
    Ok(duration)
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: PathBuf,
    timeout: Duration,
}

impl FFprobeAdapter {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_duration(&self, file_path: &str) -> Result<f64, DomainError> {
        if !Path::new(file_path).is_file() {
            return Err(DomainError::MetadataUnavailable(format!(
                "Source video not found: {}",
                file_path
            )));
        }

        let child = Command::new(&self.binary)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(file_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::MetadataUnavailable(format!(
                    "Failed to launch {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                DomainError::Timeout(format!(
                    "ffprobe exceeded {}s on {}",
                    self.timeout.as_secs(),
                    file_path
                ))
            })?
            .map_err(|e| DomainError::MetadataUnavailable(format!("ffprobe failed: {}", e)))?;

        if !output.status.success() {
            return Err(DomainError::MetadataUnavailable(format!(
                "ffprobe failed on {}: {}",
                file_path,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}
