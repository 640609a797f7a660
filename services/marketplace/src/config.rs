use std::path::PathBuf;

use serde::Deserialize;

use roomshare_core::config::Config;

/// Marketplace service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for signing session tokens. Env var: `SESSION_SECRET`.
    pub session_secret: String,
    /// TCP port for the HTTP server (default 3000). Env var: `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Cookie domain attribute; host-only cookie when unset.
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
    /// Directory uploaded files are written to and served from.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// URL prefix uploaded files are served under (default `/uploads`).
    #[serde(default = "default_public_url_prefix")]
    pub public_url_prefix: String,
    /// Largest accepted request body in bytes (default 10 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Config for MarketplaceConfig {}

fn default_port() -> u16 {
    3000
}

fn default_cookie_secure() -> bool {
    true
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_public_url_prefix() -> String {
    "/uploads".to_owned()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
