//! `llamaocr-config` — LlamaOCR runtime configuration.
//!
//! Provides:
//! - Typed config schema (server, model, uploads, session, logging)
//! - YAML loading with a first-run fallback to defaults
//! - `${ENV_VAR}` substitution and fixed env overrides
//! - Validation with errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw_config};
pub use schema::{
    LlamaOcrConfig, LoggingConfig, ModelConfig, ProviderKind, ServerConfig, SessionConfig,
    UploadsConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `explicit` if given, else the default config file location.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => config_file_path(&config_dir()),
    }
}

/// Load, substitute env vars, apply overrides and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Validation
/// errors fail the load; warnings are left to [`log_warnings`], since the
/// logger is usually configured from the loaded config.
pub async fn load_and_prepare(path: &Path) -> Result<LlamaOcrConfig> {
    let raw = load_raw_config(path).await?;
    prepare(raw, &env::process_env())
}

/// The pipeline behind [`load_and_prepare`], with an explicit environment.
pub fn prepare(raw: Value, env: &HashMap<String, String>) -> Result<LlamaOcrConfig> {
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let mut config: LlamaOcrConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    apply_env_overrides(&mut config, env)?;

    ensure_valid(&config)?;
    Ok(config)
}

/// Fail if `config` has validation errors, logging each of them.
pub fn ensure_valid(config: &LlamaOcrConfig) -> Result<()> {
    let report = validate(config);
    if let Some(first) = report.errors.first() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        bail!("Invalid config ({} errors): {first}", report.errors.len());
    }
    Ok(())
}

/// Apply `serve --bind/--port` flags on top of a prepared config and
/// validate the result again.
pub fn with_server_overrides(
    mut config: LlamaOcrConfig,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<LlamaOcrConfig> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    ensure_valid(&config)?;
    Ok(config)
}

/// Log validation warnings for an already loaded config.
pub fn log_warnings(config: &LlamaOcrConfig) -> usize {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    report.warnings.len()
}
