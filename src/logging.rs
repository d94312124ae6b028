//! Log level parsing and subscriber setup shared by the three commands.

use crate::{Error, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Parse a `LOGLEVEL` value.
///
/// Only level names are accepted: the usual tracing names plus
/// `fatal`/`panic` (treated as `error`) and `disabled` (treated as `off`).
pub fn parse_level(raw: &str) -> Result<LevelFilter> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" | "fatal" | "panic" => Ok(LevelFilter::ERROR),
        "disabled" | "off" => Ok(LevelFilter::OFF),
        _ => Err(Error::Config(format!("Unknown log level '{}'", raw))),
    }
}

/// Install the global subscriber. Must be called at most once per process.
pub fn init(level: LevelFilter) {
    tracing_subscriber::registry()
        .with(EnvFilter::default().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
