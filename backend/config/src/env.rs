//! Environment variable handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside YAML string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes to
//!   a literal `${VAR}`.
//! - Fixed override variables (`LLAMAOCR_PORT`, `OLLAMA_URL`, ...) applied to
//!   the typed config after parsing.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::schema::LlamaOcrConfig;

/// Matches `${VAR}` and its escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const ENV_BIND: &str = "LLAMAOCR_BIND";
pub const ENV_PORT: &str = "LLAMAOCR_PORT";
pub const ENV_UPLOAD_DIR: &str = "LLAMAOCR_UPLOAD_DIR";
pub const ENV_OLLAMA_URL: &str = "OLLAMA_URL";
pub const ENV_MODEL: &str = "LLAMAOCR_MODEL";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config value tree.
///
/// Only string leaves are processed. A referenced var that is unset or empty
/// is an error.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &process_env())
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply the fixed override variables on top of the parsed config.
pub fn apply_env_overrides(config: &mut LlamaOcrConfig, env: &HashMap<String, String>) -> Result<()> {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(bind) = get(ENV_BIND) {
        config.server.bind = bind.to_string();
    }
    if let Some(port) = get(ENV_PORT) {
        config.server.port = port
            .parse()
            .with_context(|| format!("{ENV_PORT} is not a valid port: {port}"))?;
    }
    if let Some(dir) = get(ENV_UPLOAD_DIR) {
        config.uploads.dir = PathBuf::from(dir);
    }
    if let Some(url) = get(ENV_OLLAMA_URL) {
        config.model.base_url = url.to_string();
    }
    if let Some(model) = get(ENV_MODEL) {
        config.model.name = model.to_string();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"model": {"base_url": "http://${OLLAMA_HOST}:11434"}});
        let result = resolve_env_vars_with(&v, &env(&[("OLLAMA_HOST", "gpu-box")])).unwrap();
        assert_eq!(result["model"]["base_url"], "http://gpu-box:11434");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"uploads": {"dir": "${MISSING_VAR}/img"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_VAR"));
        assert!(err.contains("uploads.dir"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"name": "$${NOT_A_VAR} and ${REAL}"});
        let result = resolve_env_vars_with(&v, &env(&[("REAL", "yes")])).unwrap();
        assert_eq!(result["name"], "${NOT_A_VAR} and yes");
    }

    #[test]
    fn passthrough_non_strings_and_lowercase() {
        let v = json!({"port": 8501, "x": "${lower}", "list": ["${A}"]});
        let result = resolve_env_vars_with(&v, &env(&[("A", "a")])).unwrap();
        assert_eq!(result["port"], 8501);
        assert_eq!(result["x"], "${lower}");
        assert_eq!(result["list"][0], "a");
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut cfg = LlamaOcrConfig::default();
        apply_env_overrides(
            &mut cfg,
            &env(&[
                (ENV_BIND, "0.0.0.0"),
                (ENV_PORT, "9100"),
                (ENV_UPLOAD_DIR, "/tmp/scans"),
                (ENV_OLLAMA_URL, "http://gpu:11434"),
                (ENV_MODEL, "llava"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.server.address(), "0.0.0.0:9100");
        assert_eq!(cfg.uploads.dir, PathBuf::from("/tmp/scans"));
        assert_eq!(cfg.model.base_url, "http://gpu:11434");
        assert_eq!(cfg.model.name, "llava");
    }

    #[test]
    fn blank_override_is_ignored_and_bad_port_errors() {
        let mut cfg = LlamaOcrConfig::default();
        apply_env_overrides(&mut cfg, &env(&[(ENV_MODEL, "  ")])).unwrap();
        assert_eq!(cfg.model.name, "llama3.2-vision");

        let err = apply_env_overrides(&mut cfg, &env(&[(ENV_PORT, "http")])).unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }
}
