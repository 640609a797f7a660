use chrono::Utc;
use uuid::Uuid;

use roomshare_domain::pagination::PageRequest;

use crate::domain::repository::{FavoriteRepository, PropertyRepository};
use crate::domain::types::Property;
use crate::error::MarketplaceError;

pub struct ToggleFavoriteUseCase<P: PropertyRepository, F: FavoriteRepository> {
    pub properties: P,
    pub favorites: F,
}

impl<P: PropertyRepository, F: FavoriteRepository> ToggleFavoriteUseCase<P, F> {
    /// Returns `true` when the property is now a favorite.
    pub async fn execute(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        if self.properties.find_by_id(property_id).await?.is_none() {
            return Err(MarketplaceError::PropertyNotFound);
        }
        self.favorites.toggle(user_id, property_id, Utc::now()).await
    }
}

pub struct ListFavoritesUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> ListFavoritesUseCase<F> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError> {
        self.favorites.list_properties(user_id, page).await
    }
}
