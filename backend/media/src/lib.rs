//! Image ingestion for LlamaOCR.
//!
//! Uploaded images are written verbatim into one directory under their
//! original filename, served back for redisplay, and swept by a retention
//! reaper.

pub mod media_server;
pub mod mime_detect;
pub mod reaper;
pub mod store;

pub use media_server::media_router;
pub use mime_detect::{detect_mime_type, is_inline_safe};
pub use reaper::UploadReaper;
pub use store::{sanitize_filename, StoredImage, UploadStore, UPLOADS_URL_PREFIX};
