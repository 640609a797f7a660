use anyhow::{Context as _, anyhow};
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use chrono::Utc;
use uuid::Uuid;

use roomshare_auth_types::token::issue_session_token;

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, validate_email, validate_password};
use crate::error::MarketplaceError;

/// Hash a password with Argon2id and a random salt (PHC string).
pub fn hash_password(password: &str) -> Result<String, MarketplaceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, MarketplaceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("parse password hash: {e}"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("verify password: {e}").into()),
    }
}

/// Argon2 is CPU-bound; both operations run on the blocking pool.
async fn hash_password_blocking(password: String) -> Result<String, MarketplaceError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("join password hashing task")?
}

async fn verify_password_blocking(
    password: String,
    hash: String,
) -> Result<bool, MarketplaceError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("join password verification task")?
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Signed-in user together with a fresh session token.
pub struct SessionOutput {
    pub user: User,
    pub token: String,
    pub expires_at: u64,
}

fn start_session(user: User, secret: &str) -> Result<SessionOutput, MarketplaceError> {
    let (token, expires_at) =
        issue_session_token(user.id, user.role(), secret).context("issue session token")?;
    Ok(SessionOutput {
        user,
        token,
        expires_at,
    })
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

pub struct RegisterUseCase<R: UserRepository> {
    pub users: R,
    pub session_secret: String,
}

impl<R: UserRepository> RegisterUseCase<R> {
    pub async fn execute(&self, input: RegisterInput) -> Result<SessionOutput, MarketplaceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(MarketplaceError::invalid("name is required"));
        }
        let email = normalize_email(&input.email);
        if !validate_email(&email) {
            return Err(MarketplaceError::invalid("invalid email address"));
        }
        if !validate_password(&input.password) {
            return Err(MarketplaceError::invalid(
                "password must be at least 8 characters",
            ));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(MarketplaceError::EmailTaken);
        }

        let password_hash = hash_password_blocking(input.password).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            email,
            password_hash,
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            avatar_url: None,
            bio: None,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        start_session(user, &self.session_secret)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginUseCase<R: UserRepository> {
    pub users: R,
    pub session_secret: String,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionOutput, MarketplaceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(MarketplaceError::InvalidCredentials)?;
        if !verify_password_blocking(password.to_owned(), user.password_hash.clone()).await? {
            return Err(MarketplaceError::InvalidCredentials);
        }
        start_session(user, &self.session_secret)
    }
}
