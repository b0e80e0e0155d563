//! Common utilities and helpers

use std::future::Future;
use std::time::{Duration, Instant};

use crate::ports::{LogEvent, LogLevel, LogPort};

/// Format duration for display
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let milliseconds = duration.subsec_millis();

    if hours > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
    } else {
        format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
    }
}

/// Format an offset in seconds as a timestamp
pub fn format_seconds(seconds: f64) -> String {
    format_duration(Duration::from_secs_f64(seconds.max(0.0)))
}

/// Await `operation` and log how long it took, success or not
pub async fn timed<T, F>(log_port: &dyn LogPort, label: &str, operation: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let output = operation.await;
    let elapsed = started.elapsed();
    log_port
        .log_event(
            &LogEvent::new(LogLevel::Debug, format!("{} finished", label))
                .with("elapsed", format_duration(elapsed))
                .with("elapsed_ms", elapsed.as_millis()),
        )
        .await;
    output
}
