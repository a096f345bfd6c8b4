//! Log output for the `quickmeet` binary.
//!
//! Interactive commands stay quiet below `warn`; the server logs requests
//! at `info`, optionally as JSON lines. `RUST_LOG` overrides the level.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Line format of log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Subscriber settings, built from one of the presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub timestamps: bool,
    /// File and line of the call site.
    pub locations: bool,
    /// Module path of the call site.
    pub targets: bool,
}

impl TracingConfig {
    /// `quickmeet schedule`, `instant`, `auth`, `config`.
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            timestamps: false,
            locations: false,
            targets: false,
        }
    }

    /// Any command run with `--debug`.
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            locations: true,
            targets: true,
            ..Self::cli()
        }
    }

    /// `quickmeet server`.
    pub fn server() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            timestamps: true,
            locations: false,
            targets: true,
        }
    }

    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.format = if json { LogFormat::Json } else { LogFormat::Compact };
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(self.level)))
    }
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let layer = fmt::layer()
        .with_file(config.locations)
        .with_line_number(config.locations)
        .with_target(config.targets);

    let layer = match (config.format, config.timestamps) {
        (LogFormat::Json, _) => layer.json().boxed(),
        (LogFormat::Compact, true) => layer.compact().boxed(),
        (LogFormat::Compact, false) => layer.compact().without_time().boxed(),
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(layer)
        .try_init()?;
    Ok(())
}

/// Covers every quickmeet crate plus `tower_http` request traces.
fn default_directive(level: Level) -> String {
    format!("quickmeet={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_quiet() {
        let config = TracingConfig::cli();
        assert_eq!(config.level, Level::WARN);
        assert!(!config.timestamps);
        assert!(!config.targets);
    }

    #[test]
    fn debug_adds_call_sites() {
        let config = TracingConfig::cli_debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.locations);
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn server_can_log_json() {
        let config = TracingConfig::server();
        assert_eq!(config.level, Level::INFO);
        assert!(config.timestamps);
        assert_eq!(config.with_json(true).format, LogFormat::Json);
        assert_eq!(TracingConfig::server().with_json(false), TracingConfig::server());
    }

    #[test]
    fn default_directive_covers_http_traces() {
        assert_eq!(
            default_directive(Level::DEBUG),
            "quickmeet=DEBUG,tower_http=DEBUG"
        );
    }
}
