//! Config validation: field checks with user-friendly messages.

use crate::schema::{LlamaOcrConfig, ProviderKind};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &LlamaOcrConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_model(config, &mut report);
    validate_uploads(config, &mut report);
    validate_session(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &LlamaOcrConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.bind.trim().is_empty() {
        report.error("server.bind", "Bind address cannot be empty");
    } else if !matches!(server.bind.as_str(), "127.0.0.1" | "localhost" | "::1") {
        report.warn(
            "server.bind",
            format!("Binding to {} exposes the service, which has no authentication", server.bind),
        );
    }
    if server.port == 0 {
        report.error("server.port", "Port must be > 0");
    } else if server.port < 1024 {
        report.warn(
            "server.port",
            format!("Port {} requires elevated privileges; consider using a port >= 1024", server.port),
        );
    }
}

fn validate_model(config: &LlamaOcrConfig, report: &mut ValidationReport) {
    let model = &config.model;
    if model.name.trim().is_empty() {
        report.error("model.name", "Model name cannot be empty");
    }
    if model.provider == ProviderKind::Ollama
        && !(model.base_url.starts_with("http://") || model.base_url.starts_with("https://"))
    {
        report.error("model.base_url", format!("'{}' is not an http(s) URL", model.base_url));
    }
    if model.provider == ProviderKind::Mock {
        report.warn("model.provider", "Mock provider selected; results are canned");
    }
    if model.request_timeout_secs == 0 {
        report.error("model.request_timeout_secs", "request_timeout_secs must be >= 1");
    }
    if let Some(t) = model.temperature {
        if !(0.0..=2.0).contains(&t) {
            report.error("model.temperature", "temperature must be between 0.0 and 2.0");
        }
    }
    if model.max_tokens == Some(0) {
        report.error("model.max_tokens", "max_tokens must be >= 1 when set");
    }
}

fn validate_uploads(config: &LlamaOcrConfig, report: &mut ValidationReport) {
    let uploads = &config.uploads;
    if uploads.dir.as_os_str().is_empty() {
        report.error("uploads.dir", "Upload directory cannot be empty");
    }
    if uploads.max_upload_bytes == 0 {
        report.error("uploads.max_upload_bytes", "max_upload_bytes must be > 0");
    }
    if uploads.sweep_interval().is_none()
        && (uploads.max_age().is_some() || uploads.max_files().is_some())
    {
        report.warn(
            "uploads.sweep_interval_secs",
            "Retention limits are set but the reaper is disabled",
        );
    }
}

fn validate_session(config: &LlamaOcrConfig, report: &mut ValidationReport) {
    let session = &config.session;
    if session.idle_timeout().is_some() && session.reap_interval().is_none() {
        report.warn(
            "session.reap_interval_secs",
            "Idle timeout is set but idle sessions are never reaped",
        );
    }
    if session.max_chat_turns().is_none() {
        report.warn("session.max_chat_turns", "Chat history is unbounded");
    }
}

fn validate_logging(config: &LlamaOcrConfig, report: &mut ValidationReport) {
    let level = config.logging.level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        report.error(
            "logging.level",
            format!("Unknown level '{}'. Use trace, debug, info, warn or error", config.logging.level),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_without_warnings() {
        let report = validate(&LlamaOcrConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn bad_base_url_is_error() {
        let mut cfg = LlamaOcrConfig::default();
        cfg.model.base_url = "localhost:11434".into();
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "model.base_url");
    }

    #[test]
    fn mock_provider_skips_url_check() {
        let mut cfg = LlamaOcrConfig::default();
        cfg.model.provider = ProviderKind::Mock;
        cfg.model.base_url = String::new();
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "model.provider");
    }

    #[test]
    fn zero_timeout_and_bad_level_are_errors() {
        let mut cfg = LlamaOcrConfig::default();
        cfg.model.request_timeout_secs = 0;
        cfg.logging.level = "loud".into();
        let report = validate(&cfg);
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["model.request_timeout_secs", "logging.level"]);
    }

    #[test]
    fn public_bind_is_warning() {
        let mut cfg = LlamaOcrConfig::default();
        cfg.server.bind = "0.0.0.0".into();
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "server.bind");
    }
}
