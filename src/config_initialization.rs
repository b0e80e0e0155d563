//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter};
use crate::adapters::llm_openai::API_KEY_ENV;
use crate::cli::args::ExtractionOptions;
use crate::cli::{Cli, Commands};

/// Configuration after every layer has been applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AppConfig,
    /// File the configuration was read from, if any
    pub file: Option<PathBuf>,
    /// Names of the environment variables that overrode a setting
    pub env_overrides: Vec<&'static str>,
}

/// Build configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<ResolvedConfig> {
    resolve_with_env(cli, |name| std::env::var(name).ok())
}

/// Same as [`initialize_configuration_hierarchy`] with an injectable environment
pub fn resolve_with_env<F>(cli: &Cli, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match &cli.config {
        Some(path) => Some(path.clone()),
        None => TomlConfigAdapter::discover(),
    };
    let mut config = match &file {
        Some(path) => TomlConfigAdapter::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };

    let env_overrides = apply_environment(&mut config, env)?;
    apply_cli_overrides(&mut config, cli);

    config.validate().context("Invalid configuration")?;
    Ok(ResolvedConfig {
        config,
        file,
        env_overrides,
    })
}

/// Apply `HIGHLIGHT_*` and `OPENAI_API_KEY` overrides
fn apply_environment<F>(config: &mut AppConfig, env: F) -> Result<Vec<&'static str>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    let mut take = |name: &'static str| {
        let value = env(name).filter(|v| !v.trim().is_empty());
        if value.is_some() {
            applied.push(name);
        }
        value
    };

    if let Some(v) = take("HIGHLIGHT_LOG_LEVEL") {
        config.logging.level = v;
    }
    if let Some(v) = take("HIGHLIGHT_LOG_FORMAT") {
        config.logging.format = v;
    }
    if let Some(v) = take("HIGHLIGHT_CATEGORY") {
        config.selection.category = v;
    }
    if let Some(v) = take("HIGHLIGHT_OUTPUT_DIR") {
        config.extraction.output_dir = PathBuf::from(v);
    }
    if let Some(v) = take("HIGHLIGHT_LLM_MODEL") {
        config.llm.model = v;
    }
    if let Some(v) = take("HIGHLIGHT_LLM_BASE_URL") {
        config.llm.base_url = v;
    }
    if let Some(v) = take("HIGHLIGHT_LLM_TIMEOUT_SECS") {
        config.llm.timeout_secs = parse_number("HIGHLIGHT_LLM_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = take("HIGHLIGHT_FFMPEG") {
        config.extraction.ffmpeg_path = PathBuf::from(v);
    }
    if let Some(v) = take("HIGHLIGHT_FFPROBE") {
        config.extraction.ffprobe_path = PathBuf::from(v);
    }
    if let Some(v) = take("HIGHLIGHT_ACCELERATION") {
        config.extraction.acceleration = v;
    }
    if let Some(v) = take("HIGHLIGHT_MAX_PARALLEL") {
        config.extraction.max_parallel = Some(parse_number("HIGHLIGHT_MAX_PARALLEL", &v)?);
    }
    if let Some(v) = take("HIGHLIGHT_CRF") {
        config.extraction.crf = parse_number("HIGHLIGHT_CRF", &v)?;
    }
    if let Some(v) = take("HIGHLIGHT_FONT_FILE") {
        config.vertical.font_file = Some(PathBuf::from(v));
    }
    if let Some(v) = take(API_KEY_ENV) {
        config.llm.api_key = Some(v);
    }

    Ok(applied)
}

fn parse_number<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: '{}'", name, value))
}

/// Apply command-line overrides
fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    match &cli.command {
        Commands::Run(args) => {
            if let Some(category) = &args.category {
                config.selection.category = category.clone();
            }
            if args.titles {
                config.selection.titles = true;
            }
            apply_extraction_options(config, &args.extraction);
        }
        Commands::Select(args) => {
            if let Some(category) = &args.category {
                config.selection.category = category.clone();
            }
            if args.titles {
                config.selection.titles = true;
            }
        }
        Commands::Extract(args) => apply_extraction_options(config, &args.extraction),
        Commands::Inspect(_) | Commands::List(_) => {}
    }
}

fn apply_extraction_options(config: &mut AppConfig, options: &ExtractionOptions) {
    if options.vertical {
        config.vertical.enabled = true;
    }
    if let Some(font) = &options.font {
        config.vertical.font_file = Some(font.clone());
    }
    if let Some(acceleration) = &options.acceleration {
        config.extraction.acceleration = acceleration.clone();
    }
    if let Some(max_parallel) = options.max_parallel {
        config.extraction.max_parallel = Some(max_parallel);
    }
}
