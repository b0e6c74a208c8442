//! Wiring from config to runtime components.

use std::sync::Arc;

use llamaocr_config::{log_warnings, LlamaOcrConfig, ModelConfig, ProviderKind};
use llamaocr_core::LlmProvider;
use llamaocr_logging::{init_logger, LogOptions};
use llamaocr_providers::{MockProvider, OllamaProvider};
use llamaocr_understanding::ModelSettings;
use tracing::info;

/// Install the global logger and report config warnings through it.
pub fn init_logging(config: &LlamaOcrConfig) {
    init_logger(&LogOptions {
        level: config.logging.level.clone(),
        dir: config.logging.dir.clone(),
        json: config.logging.json,
    });
    log_warnings(config);
}

pub fn build_provider(model: &ModelConfig) -> Arc<dyn LlmProvider> {
    match model.provider {
        ProviderKind::Ollama => {
            info!(url = %model.base_url, model = %model.name, "Using Ollama provider");
            Arc::new(OllamaProvider::new().with_base_url(model.base_url.clone()))
        }
        ProviderKind::Mock => {
            info!("Using mock provider");
            Arc::new(MockProvider::new("mock"))
        }
    }
}

pub fn model_settings(model: &ModelConfig) -> ModelSettings {
    let mut settings = ModelSettings::new(model.name.clone()).with_timeout(model.request_timeout());
    settings.temperature = model.temperature;
    settings.max_tokens = model.max_tokens;
    settings
}
