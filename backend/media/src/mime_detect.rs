//! MIME type detection for stored images.
//!
//! Used by the media server to label files it sends back to the page.

use std::path::Path;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        _              => "application/octet-stream",
    }
}

/// Whether a file is safe to serve inline (not just download).
pub fn is_inline_safe(mime: &str) -> bool {
    matches!(mime, "image/jpeg" | "image/png" | "image/gif")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_accepted_upload_types() {
        assert_eq!(detect_mime_type(&PathBuf::from("photo.jpg")), "image/jpeg");
        assert_eq!(detect_mime_type(&PathBuf::from("photo.JPEG")), "image/jpeg");
        assert_eq!(detect_mime_type(&PathBuf::from("scan.png")), "image/png");
        assert_eq!(detect_mime_type(&PathBuf::from("anim.gif")), "image/gif");
    }

    #[test]
    fn unknown_extension_fallback() {
        assert_eq!(detect_mime_type(&PathBuf::from("file.xyz")), "application/octet-stream");
        assert_eq!(detect_mime_type(&PathBuf::from("photo.webp")), "application/octet-stream");
        assert!(!is_inline_safe("application/octet-stream"));
        assert!(is_inline_safe("image/gif"));
    }
}
