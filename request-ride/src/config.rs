use anyhow::Context;
use lambda_runtime::tracing::level_filters::LevelFilter;
use std::env;

/// Settings read once at cold start.
#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) log_level: LevelFilter,
    pub(crate) request_unicorn_url: String,
}

impl Config {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        let log_level = env::var("LOG_LEVEL")
            .map(|level| parse_log_level(&level))
            .unwrap_or(LevelFilter::INFO);

        let request_unicorn_url =
            env::var("REQUEST_UNICORN_URL").context("REQUEST_UNICORN_URL is not set")?;

        Ok(Self {
            log_level,
            request_unicorn_url,
        })
    }
}

/// Accepts both tracing and Python-style level names. Unknown values fall back to INFO.
pub(crate) fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => LevelFilter::TRACE,
        "DEBUG" => LevelFilter::DEBUG,
        "WARN" | "WARNING" => LevelFilter::WARN,
        "ERROR" | "CRITICAL" | "FATAL" => LevelFilter::ERROR,
        "OFF" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}
