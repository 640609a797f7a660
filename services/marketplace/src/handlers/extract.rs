use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use roomshare_auth_types::session::{Session, SessionRejection};
use roomshare_domain::pagination::PageRequest;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::MarketplaceError;
use crate::state::AppState;

/// Signed-in user, re-read from the database on every request so that
/// deleted accounts and revoked admin flags take effect immediately.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = MarketplaceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let user = state
            .user_repo()
            .find_by_id(session.user_id)
            .await?
            .ok_or(SessionRejection::Missing)?;
        Ok(Self(user))
    }
}

/// Signed-in administrator. Rejects other users with 403.
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = MarketplaceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(MarketplaceError::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Parse a raw query string with `serde_qs`; absent query yields the default.
pub fn parse_query<T>(raw_query: Option<&str>) -> Result<T, MarketplaceError>
where
    T: DeserializeOwned + Default,
{
    raw_query
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|e| MarketplaceError::invalid(format!("invalid query: {e}")))
        .map(Option::unwrap_or_default)
}

/// Star score from a JSON body. Anything but an integer (fractions,
/// exponents, strings, out-of-range numbers, null) is an invalid score.
pub fn json_score(value: &serde_json::Value) -> Result<i64, MarketplaceError> {
    value.as_i64().ok_or(MarketplaceError::InvalidScore)
}

pub fn page_request(per_page: Option<u32>, page: Option<u32>) -> PageRequest {
    PageRequest::from_query(per_page, page)
}
