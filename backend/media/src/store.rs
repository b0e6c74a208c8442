//! Upload directory: the write sink for uploaded images.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use llamaocr_core::{OcrError, UploadedImage};

/// URL prefix the media router is mounted under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// An image persisted by [`UploadStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: usize,
}

impl StoredImage {
    /// URL the page uses to display the stored image.
    pub fn url(&self) -> String {
        format!("{UPLOADS_URL_PREFIX}/{}", encode_path_segment(&self.filename))
    }
}

/// Writes uploaded bytes verbatim into one directory, keyed by filename.
///
/// Same-name uploads overwrite each other; there is no identity check.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Upload store ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Persist `image` under its (sanitized) original filename.
    pub async fn save(&self, image: &UploadedImage) -> Result<StoredImage, OcrError> {
        let filename = sanitize_filename(&image.filename)?;
        if !image.has_accepted_extension() {
            return Err(OcrError::UnsupportedImageType(
                image.extension().unwrap_or_default(),
            ));
        }

        let path = self.path_for(&filename);
        fs::write(&path, &image.data).await?;
        info!(file = %filename, bytes = image.data.len(), "Stored upload");

        Ok(StoredImage {
            filename,
            path,
            size_bytes: image.data.len(),
        })
    }
}

/// Keep only the final path component of a client-supplied filename.
pub fn sanitize_filename(raw: &str) -> Result<String, OcrError> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(OcrError::InvalidFilename(raw.to_string()));
    }
    Ok(name.to_string())
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
