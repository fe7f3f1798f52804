use anyhow::Context;
use lambda_runtime::tracing::level_filters::LevelFilter;
use std::env;
use std::path::PathBuf;

/// Packaged front-end folder, relative to the function's working directory.
const DEFAULT_SITE_SOURCE: &str = "wild-rydes/static";

const DEFAULT_KEY_PREFIX: &str = "logs/test/test-results";

#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) log_level: LevelFilter,
    pub(crate) bucket_name: String,
    pub(crate) site_source: PathBuf,
    pub(crate) key_prefix: String,
}

impl Config {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            log_level: env::var("LOG_LEVEL")
                .map(|level| parse_log_level(&level))
                .unwrap_or(LevelFilter::INFO),
            bucket_name: env::var("BUCKET_NAME").context("BUCKET_NAME is not set")?,
            site_source: env::var("SITE_SOURCE")
                .unwrap_or_else(|_| DEFAULT_SITE_SOURCE.to_string())
                .into(),
            key_prefix: env::var("KEY_PREFIX").unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string()),
        })
    }
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => LevelFilter::TRACE,
        "DEBUG" => LevelFilter::DEBUG,
        "WARN" | "WARNING" => LevelFilter::WARN,
        "ERROR" | "CRITICAL" | "FATAL" => LevelFilter::ERROR,
        "OFF" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}
