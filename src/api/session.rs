//! Session cookie handling for the action endpoints.

use crate::session::SessionStore;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "SYNC_SESSION";

/// Session id sent by the browser, if any
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, id)| id.to_string())
        .filter(|id| !id.is_empty())
}

/// Existing session id, or a new session plus the cookie announcing it
pub fn resolve(sessions: &SessionStore, headers: &HeaderMap) -> (String, Option<String>) {
    match session_id(headers) {
        Some(id) => (id, None),
        None => {
            let id = sessions.create_session();
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
            (id, Some(cookie))
        }
    }
}

/// Attach a `Set-Cookie` header when a session was just opened
pub fn with_cookie(mut response: Response, cookie: Option<String>) -> Response {
    if let Some(cookie) = cookie {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// Non-empty `Referer` header
pub fn referer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; SYNC_SESSION=abc-123; lang=fr"),
        );
        assert_eq!(session_id(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_missing_or_empty_session_cookie() {
        let mut headers = HeaderMap::new();
        assert!(session_id(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("SYNC_SESSION="));
        assert!(session_id(&headers).is_none());
    }

    #[test]
    fn test_resolve_opens_session_once() {
        let sessions = SessionStore::new(600);
        let (id, cookie) = resolve(&sessions, &HeaderMap::new());
        let cookie = cookie.unwrap();
        assert!(cookie.starts_with(&format!("SYNC_SESSION={}", id)));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&format!("SYNC_SESSION={}", id)).unwrap());
        let (same, cookie) = resolve(&sessions, &headers);
        assert_eq!(same, id);
        assert!(cookie.is_none());
    }

    #[test]
    fn test_referer() {
        let mut headers = HeaderMap::new();
        assert!(referer(&headers).is_none());

        headers.insert(header::REFERER, HeaderValue::from_static(""));
        assert!(referer(&headers).is_none());

        headers.insert(header::REFERER, HeaderValue::from_static("https://admin.example.com/connectors"));
        assert_eq!(referer(&headers).as_deref(), Some("https://admin.example.com/connectors"));
    }
}
