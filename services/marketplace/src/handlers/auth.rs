use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use roomshare_auth_types::cookie::{clear_session_cookie, set_session_cookie};

use crate::error::MarketplaceError;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::auth::{LoginUseCase, RegisterInput, RegisterUseCase};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        session_secret: state.session_secret(),
    };
    let output = usecase
        .execute(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
        })
        .await?;
    let jar = set_session_cookie(jar, output.token, &state.cookies);
    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserResponse::from(output.user)),
    ))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        session_secret: state.session_secret(),
    };
    let output = usecase.execute(&body.email, &body.password).await?;
    tracing::info!(user_id = %output.user.id, "user logged in");
    let jar = set_session_cookie(jar, output.token, &state.cookies);
    Ok((jar, Json(UserResponse::from(output.user))))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        clear_session_cookie(jar, &state.cookies),
    )
}
