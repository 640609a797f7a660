use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::MarketplaceError;
use crate::handlers::extract::{CurrentUser, page_request, parse_query};
use crate::handlers::property::{PageQuery, PropertyResponse};
use crate::state::AppState;
use crate::usecase::favorite::{ListFavoritesUseCase, ToggleFavoriteUseCase};

// ── POST /properties/{id}/favorite ───────────────────────────────────────────

#[derive(Serialize)]
pub struct FavoriteResponse {
    pub property_id: Uuid,
    pub favorited: bool,
}

pub async fn toggle_favorite(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<FavoriteResponse>, MarketplaceError> {
    let usecase = ToggleFavoriteUseCase {
        properties: state.property_repo(),
        favorites: state.favorite_repo(),
    };
    let favorited = usecase.execute(user.id, property_id).await?;
    Ok(Json(FavoriteResponse {
        property_id,
        favorited,
    }))
}

// ── GET /favorites ───────────────────────────────────────────────────────────

pub async fn list_favorites(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<PropertyResponse>>, MarketplaceError> {
    let query: PageQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListFavoritesUseCase {
        favorites: state.favorite_repo(),
    };
    let properties = usecase
        .execute(user.id, page_request(query.per_page, query.page))
        .await?;
    Ok(Json(
        properties.into_iter().map(PropertyResponse::from).collect(),
    ))
}
