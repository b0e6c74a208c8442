//! Session cookie handling.
//!
//! Every page and API request is bound to a [`Session`] before it reaches a
//! handler. Requests without a valid cookie get a fresh session and a
//! `Set-Cookie` on the way out.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use llamaocr_session::{Session, SessionId};

use crate::error::ApiError;
use crate::server::GatewayState;

pub const SESSION_COOKIE: &str = "llamaocr_session";

/// The session bound to the current request.
#[derive(Clone)]
pub struct CurrentSession(pub Arc<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentSession>().cloned().ok_or_else(|| {
            warn!("Session layer missing on route");
            ApiError::internal("No session bound to request")
        })
    }
}

/// Middleware: resolve or create the caller's session.
pub async fn attach_session(
    State(state): State<GatewayState>,
    mut req: Request,
    next: Next,
) -> Response {
    let requested = session_id_from_headers(req.headers());
    let (session, created) = state.sessions.resolve(requested).await;
    let id = session.id;
    req.extensions_mut().insert(CurrentSession(session));

    let mut response = next.run(req).await;
    if created && !response.headers().contains_key(SET_COOKIE) {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

pub fn session_id_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: SessionId) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_cookie_among_others() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; other=1")).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn garbage_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("llamaocr_session=not-a-uuid"));
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie(Uuid::nil());
        assert!(cookie.starts_with("llamaocr_session=00000000-"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(expired_session_cookie().contains("Max-Age=0"));
    }
}
