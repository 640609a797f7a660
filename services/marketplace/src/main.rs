use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use roomshare_auth_types::cookie::CookieSettings;
use roomshare_auth_types::session::SessionKey;
use roomshare_core::config::Config;
use roomshare_core::tracing::init_tracing;

use roomshare_marketplace::config::MarketplaceConfig;
use roomshare_marketplace::infra::storage::LocalFileStore;
use roomshare_marketplace::router::build_router;
use roomshare_marketplace::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = MarketplaceConfig::from_env().context("load configuration")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let files = LocalFileStore::new(&config.public_dir, &config.public_url_prefix);
    let state = AppState {
        db: Arc::new(db),
        session_key: SessionKey::new(config.session_secret.as_str()),
        cookies: CookieSettings {
            domain: config.cookie_domain.clone(),
            secure: config.cookie_secure,
        },
        files,
        max_upload_bytes: config.max_upload_bytes,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("marketplace service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
