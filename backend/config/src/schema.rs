//! LlamaOCR runtime configuration schema.
//!
//! Every section is optional in YAML; missing fields take the values in
//! [`crate::defaults`]. A zero in a retention field disables that rule.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlamaOcrConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub uploads: UploadsConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::DEFAULT_BIND.to_string(),
            port: defaults::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Which backend answers inference calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    /// Canned responses; for demos and offline runs.
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub base_url: String,
    pub name: String,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: defaults::DEFAULT_OLLAMA_URL.to_string(),
            name: defaults::DEFAULT_MODEL.to_string(),
            request_timeout_secs: defaults::DEFAULT_REQUEST_TIMEOUT_SECS,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ModelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub dir: PathBuf,
    pub max_upload_bytes: usize,
    pub max_age_secs: u64,
    pub max_files: usize,
    pub sweep_interval_secs: u64,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(defaults::DEFAULT_UPLOAD_DIR),
            max_upload_bytes: defaults::DEFAULT_MAX_UPLOAD_BYTES,
            max_age_secs: defaults::DEFAULT_UPLOAD_MAX_AGE_SECS,
            max_files: defaults::DEFAULT_UPLOAD_MAX_FILES,
            sweep_interval_secs: defaults::DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl UploadsConfig {
    pub fn max_age(&self) -> Option<Duration> {
        nonzero_secs(self.max_age_secs)
    }

    pub fn max_files(&self) -> Option<usize> {
        (self.max_files > 0).then_some(self.max_files)
    }

    /// `None` when the reaper is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        nonzero_secs(self.sweep_interval_secs)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    pub max_chat_turns: usize,
    pub reap_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: defaults::DEFAULT_SESSION_IDLE_SECS,
            max_chat_turns: defaults::DEFAULT_MAX_CHAT_TURNS,
            reap_interval_secs: defaults::DEFAULT_SESSION_REAP_INTERVAL_SECS,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        nonzero_secs(self.idle_timeout_secs)
    }

    pub fn max_chat_turns(&self) -> Option<usize> {
        (self.max_chat_turns > 0).then_some(self.max_chat_turns)
    }

    pub fn reap_interval(&self) -> Option<Duration> {
        nonzero_secs(self.reap_interval_secs)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Daily-rolling JSON log files go here when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Console output as JSON instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            dir: None,
            json: false,
        }
    }
}

fn nonzero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let cfg: LlamaOcrConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, LlamaOcrConfig::default());
        assert_eq!(cfg.model.name, "llama3.2-vision");
        assert_eq!(cfg.model.base_url, "http://localhost:11434");
        assert_eq!(cfg.model.request_timeout(), Duration::from_secs(300));
        assert_eq!(cfg.uploads.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let yaml = "model:\n  provider: mock\n  temperature: 0.2\nserver:\n  port: 9000\n";
        let cfg: LlamaOcrConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.model.provider, ProviderKind::Mock);
        assert_eq!(cfg.model.temperature, Some(0.2));
        assert_eq!(cfg.model.name, "llama3.2-vision");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.bind, "127.0.0.1");
    }

    #[test]
    fn zero_disables_retention_rules() {
        let cfg = UploadsConfig {
            max_age_secs: 0,
            max_files: 0,
            sweep_interval_secs: 0,
            ..Default::default()
        };
        assert!(cfg.max_age().is_none());
        assert!(cfg.max_files().is_none());
        assert!(cfg.sweep_interval().is_none());

        let session = SessionConfig {
            max_chat_turns: 0,
            ..Default::default()
        };
        assert!(session.max_chat_turns().is_none());
        assert_eq!(session.idle_timeout(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let result: Result<LlamaOcrConfig, _> = serde_yaml::from_str("model:\n  provider: openai\n");
        assert!(result.is_err());
    }
}
