use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Rating, RatingSummary};
use crate::error::MarketplaceError;
use crate::handlers::extract::{AdminUser, json_score, page_request, parse_query};
use crate::handlers::property::PageQuery;
use crate::state::AppState;
use crate::usecase::rating::{
    AmendRatingInput, AmendRatingUseCase, DeleteRatingUseCase, ListRatingsUseCase, RatingOutcome,
};

#[derive(Serialize)]
pub struct RatingResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub score: u8,
    pub comment: Option<String>,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(r: Rating) -> Self {
        Self {
            id: r.id,
            booking_id: r.booking_id,
            property_id: r.property_id,
            user_id: r.user_id,
            score: r.score,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Property aggregate after a rating change.
#[derive(Serialize)]
pub struct RatingSummaryResponse {
    pub rating_avg: f64,
    pub rating_count: i32,
}

impl From<RatingSummary> for RatingSummaryResponse {
    fn from(s: RatingSummary) -> Self {
        Self {
            rating_avg: s.average,
            rating_count: s.count,
        }
    }
}

#[derive(Serialize)]
pub struct RatingOutcomeResponse {
    pub rating: RatingResponse,
    pub summary: RatingSummaryResponse,
}

impl From<RatingOutcome> for RatingOutcomeResponse {
    fn from(outcome: RatingOutcome) -> Self {
        Self {
            rating: outcome.rating.into(),
            summary: outcome.summary.into(),
        }
    }
}

// ── GET /admin/ratings ───────────────────────────────────────────────────────

pub async fn list_ratings(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<RatingResponse>>, MarketplaceError> {
    let query: PageQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListRatingsUseCase {
        ratings: state.rating_repo(),
    };
    let ratings = usecase
        .execute(page_request(query.per_page, query.page))
        .await?;
    Ok(Json(ratings.into_iter().map(RatingResponse::from).collect()))
}

// ── PATCH /admin/ratings/{id} ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AmendRatingRequest {
    /// Absent or `null` leaves the score unchanged.
    pub score: Option<serde_json::Value>,
    pub comment: Option<String>,
}

pub async fn amend_rating(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AmendRatingRequest>,
) -> Result<Json<RatingOutcomeResponse>, MarketplaceError> {
    let score = body.score.as_ref().map(json_score).transpose()?;
    let usecase = AmendRatingUseCase {
        ratings: state.rating_repo(),
    };
    let outcome = usecase
        .execute(
            id,
            AmendRatingInput {
                score,
                comment: body.comment,
            },
        )
        .await?;
    tracing::info!(admin_id = %admin.id, rating_id = %id, "rating amended");
    Ok(Json(outcome.into()))
}

// ── DELETE /admin/ratings/{id} ───────────────────────────────────────────────

pub async fn delete_rating(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RatingSummaryResponse>, MarketplaceError> {
    let usecase = DeleteRatingUseCase {
        ratings: state.rating_repo(),
    };
    let summary = usecase.execute(id).await?;
    tracing::info!(admin_id = %admin.id, rating_id = %id, "rating deleted");
    Ok(Json(summary.into()))
}
