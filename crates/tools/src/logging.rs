//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, before the configuration is loaded, so the
//! loader's env-file diagnostics are visible.

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Level used when neither `--log-level` nor a usable `RUST_LOG` is given.
pub const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber, writing to stderr.
///
/// Precedence: `level` when given, then `RUST_LOG`, then [`DEFAULT_LEVEL`].
/// A `RUST_LOG` that does not parse is reported once the subscriber is up.
pub fn init(level: Option<&str>) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = resolve_filter(level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {e}"))?;

    if let Some(spec) = rejected {
        warn!(rust_log = %spec, default = DEFAULT_LEVEL, "ignoring unparseable RUST_LOG");
    }
    Ok(())
}

/// Pick the filter. The second value is a `RUST_LOG` that was rejected.
fn resolve_filter(
    level: Option<&str>,
    rust_log: Option<&str>,
) -> Result<(EnvFilter, Option<String>)> {
    if let Some(level) = level {
        let filter = EnvFilter::try_new(level)
            .map_err(|e| anyhow!("invalid log level '{level}': {e}"))?;
        return Ok((filter, None));
    }

    match rust_log {
        Some(spec) => match EnvFilter::try_new(spec) {
            Ok(filter) => Ok((filter, None)),
            Err(_) => Ok((EnvFilter::new(DEFAULT_LEVEL), Some(spec.to_string()))),
        },
        None => Ok((EnvFilter::new(DEFAULT_LEVEL), None)),
    }
}

/// Parse a log level string, rejecting unrecognised values.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    if level.is_empty() {
        return Err(anyhow!("log level must not be empty"));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| anyhow!("unrecognised log level: '{level}'"))
}
