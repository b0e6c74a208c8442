//! Config file location and reading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the LlamaOCR config directory.
/// Priority: `LLAMAOCR_CONFIG_DIR` env > `~/.llamaocr/` > `./.llamaocr`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LLAMAOCR_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".llamaocr");
    }
    PathBuf::from(".llamaocr")
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file as an untyped value tree.
///
/// Returns an empty mapping if the file doesn't exist (first run) or is empty.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value = parse_yaml(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

pub(crate) fn parse_yaml(raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value = serde_yaml::from_str(raw)?;
    match value {
        Value::Null => Ok(Value::Object(Default::default())),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_mapping() {
        let tmp = tempfile::tempdir().unwrap();
        let value = load_raw_config(&tmp.path().join("config.yaml")).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn reads_yaml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = config_file_path(tmp.path());
        std::fs::write(&path, "server:\n  port: 9000\n").unwrap();

        let value = load_raw_config(&path).await.unwrap();
        assert_eq!(value["server"]["port"], 9000);
    }

    #[tokio::test]
    async fn invalid_yaml_names_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = config_file_path(tmp.path());
        std::fs::write(&path, "server: [unclosed").unwrap();

        let err = load_raw_config(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("config.yaml"));
    }

    #[test]
    fn comment_only_file_is_empty_mapping() {
        assert_eq!(parse_yaml("# nothing here\n").unwrap(), serde_json::json!({}));
    }
}
