//! Log Redaction Layer
//!
//! Scrubs API keys, access tokens, and phone numbers from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static KEY_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(api[_-]?key|token|password|secret)(["']?\s*[:=]\s*["']?)[^\s"'&,}]+"#).unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = TELEPHONE_RE.replace_all(input, "[REDACTED_PHONE]");
    let redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    KEY_VALUE_RE
        .replace_all(&redacted, "${1}${2}[REDACTED]")
        .into_owned()
}
