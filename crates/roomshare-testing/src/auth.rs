//! Signed session cookies for integration tests.
//!
//! Handlers authenticate through the `roomshare_session` cookie. `MockSession`
//! signs a real token with the test secret so requests pass the `Session`
//! extractor without going through `/auth/login`.

use http::HeaderValue;
use uuid::Uuid;

use roomshare_auth_types::cookie::SESSION_COOKIE;
use roomshare_auth_types::token::issue_session_token;
use roomshare_domain::user::UserRole;

/// Secret shared between test app state and `MockSession`.
pub const TEST_SESSION_SECRET: &str = "roomshare-test-session-secret";

/// Configurable identity injected into test requests.
pub struct MockSession {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl MockSession {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn member(user_id: Uuid) -> Self {
        Self::new(user_id, UserRole::Member)
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, UserRole::Admin)
    }

    /// Token signed with [`TEST_SESSION_SECRET`].
    pub fn token(&self) -> String {
        issue_session_token(self.user_id, self.role, TEST_SESSION_SECRET)
            .expect("signing a test token never fails")
            .0
    }

    /// `Cookie` header value carrying the session.
    pub fn cookie_header(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", self.token()))
            .expect("JWT is a valid header value")
    }
}
