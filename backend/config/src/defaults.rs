//! Config defaults.

/// Loopback only; the service has no authentication.
pub const DEFAULT_BIND: &str = "127.0.0.1";

pub const DEFAULT_PORT: u16 = 8501;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

pub const DEFAULT_MODEL: &str = "llama3.2-vision";

/// Upper bound on a single inference call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Seven days.
pub const DEFAULT_UPLOAD_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

pub const DEFAULT_UPLOAD_MAX_FILES: usize = 1000;

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 600;

pub const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;

pub const DEFAULT_MAX_CHAT_TURNS: usize = 200;

pub const DEFAULT_SESSION_REAP_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_LOG_LEVEL: &str = "info";
