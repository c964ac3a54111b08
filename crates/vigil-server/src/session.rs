//! Session identity taken from headers set by the upstream auth layer.
//!
//! The server trusts these headers. Deployments must strip them from
//! client traffic before it reaches vigil.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use vigil_core::identity::SessionIdentity;

pub const USER_ID_HEADER: &str = "x-vigil-user-id";
pub const USER_EMAIL_HEADER: &str = "x-vigil-user-email";
pub const USER_NAME_HEADER: &str = "x-vigil-user-name";
pub const USER_AVATAR_HEADER: &str = "x-vigil-user-avatar";

/// Extractor for the caller's session. Never rejects: a request without
/// identity headers yields an anonymous session.
#[derive(Debug, Clone, Default)]
pub struct Session(pub SessionIdentity);

impl Session {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(SessionIdentity {
            user_id: header(headers, USER_ID_HEADER),
            email: header(headers, USER_EMAIL_HEADER),
            name: header(headers, USER_NAME_HEADER),
            avatar_ref: header(headers, USER_AVATAR_HEADER),
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn empty_headers_are_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(""));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("  "));
        let Session(identity) = Session::from_headers(&headers);
        assert_eq!(identity.user_id, None);
        assert_eq!(identity.email, None);
        assert!(identity.is_anonymous());
    }

    #[test]
    fn all_claims_are_read() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("usr-1"));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("ada@example.com"));
        headers.insert(USER_NAME_HEADER, HeaderValue::from_static("Ada"));
        headers.insert(USER_AVATAR_HEADER, HeaderValue::from_static("avatars/ada.png"));
        let Session(identity) = Session::from_headers(&headers);
        assert_eq!(identity.user_id.as_deref(), Some("usr-1"));
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert_eq!(identity.name.as_deref(), Some("Ada"));
        assert_eq!(identity.avatar_ref.as_deref(), Some("avatars/ada.png"));
    }
}
