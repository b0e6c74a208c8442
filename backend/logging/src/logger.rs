//! Structured Logger
//!
//! Wraps `tracing` with a console layer, an optional rolling NDJSON file
//! layer, and environment-based level control.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file prefix; the appender adds `.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "llamaocr.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Daily-rolling JSON files are written here when set.
    pub dir: Option<PathBuf>,
    /// Console output as JSON.
    pub json: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
        }
    }
}

/// `RUST_LOG` if set and parseable, else `level`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global structured logger.
///
/// Console output goes to stderr so command output on stdout stays clean.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logger(options: &LogOptions) {
    let env_filter = build_filter(&options.level);

    let console_text = (!options.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });
    let console_json = options
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));

    // Rolling file appender: writes NDJSON to `<dir>/llamaocr.log.YYYY-MM-DD`
    let file_layer = options.dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_text)
        .with(console_json)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        let tmp = tempfile::tempdir().unwrap();
        let options = LogOptions {
            level: "debug".into(),
            dir: Some(tmp.path().to_path_buf()),
            json: true,
        };
        init_logger(&options);
        init_logger(&LogOptions::default());
        tracing::info!("logger initialized");
    }

    #[test]
    fn default_level_is_info() {
        assert_eq!(LogOptions::default().level, "info");
        assert!(LogOptions::default().dir.is_none());
    }
}
