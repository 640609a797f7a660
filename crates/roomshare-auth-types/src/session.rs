//! `Session` extractor: session cookie → validated identity.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use roomshare_core::error::ApiError;
use roomshare_domain::user::UserRole;

use crate::cookie::SESSION_COOKIE;
use crate::token::{AuthError, validate_session_token};

/// HMAC secret used to sign and verify session tokens.
///
/// Handlers reach it through `FromRef` on the application state.
#[derive(Clone)]
pub struct SessionKey(Arc<str>);

impl SessionKey {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity resolved from the session cookie.
///
/// Rejects with 401 when the cookie is absent, tampered with or expired.
/// Ownership and role checks (403) happen after extraction.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionRejection {
    #[error("authentication required")]
    Missing,
    #[error("session expired")]
    Expired,
    #[error("invalid session")]
    Invalid,
}

impl From<AuthError> for SessionRejection {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Expired => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

impl ApiError for SessionRejection {
    fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Missing => "UNAUTHORIZED",
            Self::Expired => "SESSION_EXPIRED",
            Self::Invalid => "INVALID_SESSION",
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        self.to_response()
    }
}

/// Read and validate the session cookie from request headers.
pub fn session_from_parts(parts: &Parts, key: &SessionKey) -> Result<Session, SessionRejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(SessionRejection::Missing)?;
    let info = validate_session_token(&token, key.as_str())?;
    Ok(Session {
        user_id: info.user_id,
        role: info.role,
    })
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKey: FromRef<S>,
{
    type Rejection = SessionRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let key = SessionKey::from_ref(state);
        let result = session_from_parts(parts, &key);
        async move { result }
    }
}
