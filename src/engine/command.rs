//! ffmpeg argument construction
//!
//! Pure functions: identical jobs always produce identical argument lists.

use std::path::Path;

use crate::engine::VerticalConfig;
use crate::ports::{AudioMode, MediaJob};

/// Audio filter that keeps audio aligned after a seek
const AUDIO_RESYNC_FILTER: &str = "aresample=async=1";

/// Fontconfig family used when no font file is configured
const FALLBACK_FONT: &str = "Sans";

fn seconds(value: f64) -> String {
    format!("{:.3}", value)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Build the ffmpeg arguments (without the program name) for a job
pub fn build_ffmpeg_args(job: &MediaJob) -> Vec<String> {
    let mut args = vec!["-y".to_string()];

    if let Some(method) = job.acceleration {
        args.push("-hwaccel".to_string());
        args.push(method.hwaccel_name().to_string());
    }
    if let Some(start) = job.start {
        args.push("-ss".to_string());
        args.push(seconds(start));
    }
    args.push("-i".to_string());
    args.push(path_arg(&job.input));
    if let Some(duration) = job.duration {
        args.push("-t".to_string());
        args.push(seconds(duration));
    }
    if let Some(filter) = &job.video_filter {
        args.push("-vf".to_string());
        args.push(filter.clone());
    }

    args.extend([
        "-c:v".to_string(),
        job.encoding.video_codec.clone(),
        "-preset".to_string(),
        job.encoding.preset.clone(),
        "-crf".to_string(),
        job.encoding.crf.to_string(),
    ]);

    match &job.audio {
        AudioMode::Encode(codec) => args.extend([
            "-c:a".to_string(),
            codec.clone(),
            "-af".to_string(),
            AUDIO_RESYNC_FILTER.to_string(),
        ]),
        AudioMode::Copy => args.extend(["-c:a".to_string(), "copy".to_string()]),
    }

    if job.start.is_some() {
        args.push("-avoid_negative_ts".to_string());
        args.push("make_zero".to_string());
    }
    args.push(path_arg(&job.output));
    args
}

/// Escape a value for use inside a filtergraph option
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push('/'),
            '\'' | ':' | ',' | ';' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Filter chain that letterboxes a clip onto the vertical canvas and draws
/// the caption read from `caption_file`.
pub fn vertical_filter(config: &VerticalConfig, caption_file: &Path) -> String {
    let (w, h) = (config.width, config.height);
    let font = match &config.font_file {
        Some(path) => format!("fontfile={}", escape_filter_value(&path_arg(path))),
        None => format!("font={}", FALLBACK_FONT),
    };

    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,\
         drawtext={font}:textfile={text}:expansion=none:fontsize={size}:fontcolor={color}:\
         box=1:boxcolor=black@0.5:boxborderw=20:\
         x=(w-text_w)/2:y=h*{position:.3}",
        text = escape_filter_value(&path_arg(caption_file)),
        size = config.font_size,
        color = config.font_color,
        position = config.caption_position,
    )
}
