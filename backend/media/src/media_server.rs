//! Local media server: serves stored uploads over HTTP.
//!
//! Read-only; this is the redisplay path for images the page uploaded.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::{path::PathBuf, sync::Arc};
use tokio::fs;
use tracing::{debug, warn};

use crate::mime_detect::{detect_mime_type, is_inline_safe};
use crate::store::sanitize_filename;

/// State shared by media server routes.
#[derive(Clone)]
pub struct MediaServerState {
    pub media_dir: Arc<PathBuf>,
}

/// Build the media server Axum router.
///
/// Mount at `/uploads` prefix:
///   GET /uploads/:filename  — serve a stored image
pub fn media_router(media_dir: PathBuf) -> Router {
    let state = MediaServerState {
        media_dir: Arc::new(media_dir),
    };
    Router::new()
        .route("/:filename", get(serve_media))
        .with_state(state)
}

/// GET /:filename — send a stored file.
async fn serve_media(
    Path(filename): Path<String>,
    State(state): State<MediaServerState>,
) -> Response {
    if sanitize_filename(&filename).ok().as_deref() != Some(filename.as_str()) {
        warn!(filename = %filename, "Rejected suspicious media path");
        return (StatusCode::BAD_REQUEST, "Invalid filename").into_response();
    }

    let path = state.media_dir.join(&filename);
    debug!(path = %path.display(), "Serving media file");

    match fs::read(&path).await {
        Ok(bytes) => {
            let mime = detect_mime_type(&path);
            let disposition = if is_inline_safe(mime) { "inline" } else { "attachment" };

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(mime)),
                    (header::CONTENT_DISPOSITION, HeaderValue::from_static(disposition)),
                    (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Media file not found").into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read media file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read media").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn serves_stored_file_with_mime() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("scan.png"), b"png-data").unwrap();

        let response = media_router(tmp.path().to_path_buf())
            .oneshot(Request::get("/scan.png").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"png-data");
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let response = media_router(tmp.path().to_path_buf())
            .oneshot(Request::get("/nope.gif").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_names_with_inner_dots() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("scan..v2.png"), b"v2").unwrap();

        let response = media_router(tmp.path().to_path_buf())
            .oneshot(Request::get("/scan..v2.png").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn encoded_traversal_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let response = media_router(tmp.path().to_path_buf())
            .oneshot(Request::get("/..%2Fsecret.png").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
