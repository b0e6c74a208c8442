//! Chat model providers.
//!
//! `ollama` talks to a local Ollama server; `mock` returns scripted outcomes
//! and backs tests and offline demo runs.

pub mod mock;
pub mod ollama;

pub use mock::MockProvider;
pub use ollama::{OllamaProvider, DEFAULT_OLLAMA_URL};
