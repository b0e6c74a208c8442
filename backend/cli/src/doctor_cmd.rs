//! CLI Doctor Command
//!
//! Checks the configured model endpoint and upload directory.

use anyhow::Result;

use llamaocr_config::{LlamaOcrConfig, ProviderKind};
use llamaocr_providers::OllamaProvider;

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

/// Executes the full doctor diagnosis.
pub async fn run(config: &LlamaOcrConfig) -> Result<()> {
    println!("\nRunning LlamaOCR Doctor...\n");

    let mut is_ok = check_upload_dir(config).await;
    is_ok &= match config.model.provider {
        ProviderKind::Ollama => check_ollama(&config.model.base_url, &config.model.name).await,
        ProviderKind::Mock => {
            note_warn("Mock provider configured; no model endpoint to check");
            true
        }
    };

    println!();
    if is_ok {
        note_success("All checks passed! LlamaOCR is ready.");
    } else {
        note_error("Some checks failed! Please fix the errors above.");
    }
    Ok(())
}

async fn check_upload_dir(config: &LlamaOcrConfig) -> bool {
    let dir = &config.uploads.dir;
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => {
            note_info(&format!("Upload directory {} is writable", dir.display()));
            true
        }
        Err(e) => {
            note_error(&format!("Upload directory {} is not usable: {e}", dir.display()));
            false
        }
    }
}

pub async fn check_ollama(base_url: &str, model: &str) -> bool {
    let provider = OllamaProvider::new().with_base_url(base_url);
    match provider.has_model(model).await {
        Ok(true) => {
            note_info(&format!("Ollama at {base_url} has model {model}"));
            true
        }
        Ok(false) => {
            note_error(&format!(
                "Ollama at {base_url} is reachable but model {model} is not installed (run `ollama pull {model}`)"
            ));
            false
        }
        Err(e) => {
            note_error(&format!("Ollama at {base_url} is not reachable: {e}"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_endpoint_fails_check() {
        assert!(!check_ollama("http://127.0.0.1:1", "llama3.2-vision").await);
    }

    #[tokio::test]
    async fn writable_upload_dir_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = LlamaOcrConfig::default();
        config.uploads.dir = tmp.path().join("uploads");
        assert!(check_upload_dir(&config).await);
        assert!(config.uploads.dir.is_dir());
    }
}
