use lambda_runtime::tracing::level_filters::LevelFilter;
use std::env;

#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) log_level: LevelFilter,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        Self {
            log_level: env::var("LOG_LEVEL")
                .map(|level| parse_log_level(&level))
                .unwrap_or(LevelFilter::INFO),
        }
    }
}

/// `LOG_LEVEL` uses Python logging names (`WARNING`, `CRITICAL`) as well as tracing ones.
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
