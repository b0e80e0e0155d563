//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` command-line tool as a child process per job.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::errors::*;
use crate::engine::command::build_ffmpeg_args;
use crate::ports::*;

/// Lines of stderr kept for diagnostics
const DIAGNOSTIC_TAIL_LINES: usize = 20;

const CAPABILITY_TIMEOUT: Duration = Duration::from_secs(15);

/// FFmpeg-based media backend
pub struct FFmpegAdapter {
    binary: PathBuf,
    job_timeout: Duration,
}

impl FFmpegAdapter {
    pub fn new(binary: impl Into<PathBuf>, job_timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            job_timeout,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-hide_banner")
            .arg("-nostdin")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

/// Last lines of a process's stderr
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES);
    lines[skip..].join("\n")
}

/// Parse the method list printed by `ffmpeg -hwaccels`
pub fn parse_hwaccels(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl MediaBackendPort for FFmpegAdapter {
    async fn run(&self, job: &MediaJob) -> Result<BackendStatus, DomainError> {
        let args = build_ffmpeg_args(job);
        tracing::debug!(binary = %self.binary.display(), args = %args.join(" "), "Running ffmpeg");

        let child = self
            .command()
            .args(["-loglevel", "error"])
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DomainError::ExtractionFailure(format!(
                    "Failed to launch {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        // Dropping the child on timeout kills the process.
        let output = tokio::time::timeout(self.job_timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                DomainError::Timeout(format!(
                    "ffmpeg exceeded {}s writing {}",
                    self.job_timeout.as_secs(),
                    job.output.display()
                ))
            })?
            .map_err(|e| DomainError::ExtractionFailure(format!("ffmpeg did not finish: {}", e)))?;

        if output.status.success() {
            Ok(BackendStatus::succeeded())
        } else {
            Ok(BackendStatus::failed(
                output.status.code(),
                stderr_tail(&output.stderr),
            ))
        }
    }

    async fn available_accelerations(&self) -> Result<Vec<String>, DomainError> {
        let child = self
            .command()
            .arg("-hwaccels")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                DomainError::ExtractionFailure(format!(
                    "Failed to launch {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let output = tokio::time::timeout(CAPABILITY_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| DomainError::Timeout("ffmpeg -hwaccels did not answer".to_string()))?
            .map_err(|e| DomainError::ExtractionFailure(e.to_string()))?;

        if !output.status.success() {
            return Err(DomainError::ExtractionFailure(format!(
                "ffmpeg -hwaccels exited with {:?}",
                output.status.code()
            )));
        }
        Ok(parse_hwaccels(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hwaccels() {
        let stdout = "Hardware acceleration methods:\nvdpau\ncuda\nvaapi\n\n";
        assert_eq!(parse_hwaccels(stdout), vec!["vdpau", "cuda", "vaapi"]);
        assert!(parse_hwaccels("Hardware acceleration methods:\n").is_empty());
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(stderr.as_bytes());
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_extraction_failure() {
        let adapter = FFmpegAdapter::new("/nonexistent/ffmpeg-binary", Duration::from_secs(5));
        assert!(matches!(
            adapter.available_accelerations().await,
            Err(DomainError::ExtractionFailure(_))
        ));
    }
}
