use std::fmt;
use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File extensions the upload control accepts (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Raw bytes of an uploaded image together with the client-supplied filename.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Bytes,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Lowercased extension of the filename, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn has_accepted_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// One transcription kept in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRecord {
    pub filename: String,
    /// Markdown-flavored transcription as returned by the model.
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Where the page can fetch the stored image again.
    pub image_url: String,
}

impl OcrRecord {
    pub fn new(filename: impl Into<String>, text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
            created_at: Utc::now(),
            image_url: image_url.into(),
        }
    }
}

/// Listing row for the history side panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub index: usize,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, text: text.into() }
    }
}
