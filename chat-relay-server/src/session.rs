//! Per-client session identification via cookie

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use uuid::Uuid;

/// Cookie carrying the session identifier
pub const SESSION_COOKIE: &str = "chat_relay_session";

const MAX_SESSION_ID_LEN: usize = 64;

/// The session a request belongs to.
///
/// Requests without a usable cookie get a fresh identifier, which is handed
/// back to the client through `Set-Cookie` by [`SessionContext::attach`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    id: String,
    is_new: bool,
}

impl SessionContext {
    /// Start a brand new session
    pub fn fresh() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_new: true,
        }
    }

    /// Resolve the session from request headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == SESSION_COOKIE && is_valid_session_id(value))
            .map(|(_, value)| Self {
                id: value.to_string(),
                is_new: false,
            })
            .unwrap_or_else(Self::fresh)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// `Set-Cookie` value for a newly issued session
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        if !self.is_new {
            return None;
        }
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.id
        ))
        .ok()
    }

    /// Add the session cookie to a response when the session was just created
    pub fn attach(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if let Some(cookie) = self.set_cookie() {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        response
    }
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_missing_cookie_starts_fresh_session() {
        let ctx = SessionContext::from_headers(&HeaderMap::new());
        assert!(ctx.is_new());
        let cookie = ctx.set_cookie().unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("chat_relay_session="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_existing_cookie_is_reused() {
        let ctx = SessionContext::from_headers(&headers_with_cookie(
            "theme=dark; chat_relay_session=abc-123; lang=en",
        ));
        assert!(!ctx.is_new());
        assert_eq!(ctx.id(), "abc-123");
        assert!(ctx.set_cookie().is_none());
    }

    #[test]
    fn test_invalid_cookie_value_is_replaced() {
        let ctx = SessionContext::from_headers(&headers_with_cookie(
            "chat_relay_session=../../etc/passwd",
        ));
        assert!(ctx.is_new());
        assert_ne!(ctx.id(), "../../etc/passwd");

        let too_long = format!("chat_relay_session={}", "a".repeat(65));
        assert!(SessionContext::from_headers(&headers_with_cookie(&too_long)).is_new());
    }

    #[test]
    fn test_attach_sets_cookie_only_for_new_sessions() {
        let fresh = SessionContext::fresh();
        let response = fresh.attach("ok");
        assert!(response.headers().contains_key(header::SET_COOKIE));

        let known = SessionContext::from_headers(&headers_with_cookie("chat_relay_session=known"));
        let response = known.attach("ok");
        assert!(!response.headers().contains_key(header::SET_COOKIE));
    }
}
