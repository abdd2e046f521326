use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level filter and output format, decided once by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LogSettings {
    /// `RUST_LOG` for the filter, `REPORT_LOG_FORMAT=json` for JSON lines.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            filter: env::var("RUST_LOG").unwrap_or(defaults.filter),
            json: env::var("REPORT_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(settings: &LogSettings) {
    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialised");
    }
}
