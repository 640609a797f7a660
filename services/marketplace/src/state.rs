use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use roomshare_auth_types::cookie::CookieSettings;
use roomshare_auth_types::session::SessionKey;

use crate::infra::db::{
    DbBookingRepository, DbCategoryRepository, DbFavoriteRepository, DbNotificationRepository,
    DbOfferRepository, DbPropertyRepository, DbRatingRepository, DbUserRepository,
};
use crate::infra::storage::LocalFileStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    /// `DatabaseConnection` itself is not `Clone` under sea-orm's `mock` feature.
    pub db: Arc<DatabaseConnection>,
    pub session_key: SessionKey,
    pub cookies: CookieSettings,
    pub files: LocalFileStore,
    /// Upper bound on request bodies, uploads included.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn session_secret(&self) -> String {
        self.session_key.as_str().to_owned()
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn property_repo(&self) -> DbPropertyRepository {
        DbPropertyRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn offer_repo(&self) -> DbOfferRepository {
        DbOfferRepository {
            db: self.db.clone(),
        }
    }

    pub fn booking_repo(&self) -> DbBookingRepository {
        DbBookingRepository {
            db: self.db.clone(),
        }
    }

    pub fn rating_repo(&self) -> DbRatingRepository {
        DbRatingRepository {
            db: self.db.clone(),
        }
    }

    pub fn favorite_repo(&self) -> DbFavoriteRepository {
        DbFavoriteRepository {
            db: self.db.clone(),
        }
    }

    pub fn notification_repo(&self) -> DbNotificationRepository {
        DbNotificationRepository {
            db: self.db.clone(),
        }
    }

    pub fn file_store(&self) -> LocalFileStore {
        self.files.clone()
    }
}

impl FromRef<AppState> for SessionKey {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}
