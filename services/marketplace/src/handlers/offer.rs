use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Offer;
use crate::error::MarketplaceError;
use crate::handlers::extract::CurrentUser;
use crate::state::AppState;
use crate::usecase::offer::{
    CancelOfferUseCase, ListMyOffersUseCase, ListPropertyOffersUseCase, SubmitOfferInput,
    SubmitOfferUseCase, UpdateOfferStatusUseCase,
};

#[derive(Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub price: String,
    pub message: Option<String>,
    pub move_in_date: Option<NaiveDate>,
    pub status: &'static str,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Offer> for OfferResponse {
    fn from(o: Offer) -> Self {
        Self {
            id: o.id,
            property_id: o.property_id,
            user_id: o.user_id,
            price: o.price,
            message: o.message,
            move_in_date: o.move_in_date,
            status: o.status.as_str(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

// ── POST /properties/{id}/offers ─────────────────────────────────────────────

/// Offer price as sent by clients: `"500"` or `500`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Text(String),
    Number(serde_json::Number),
}

impl PriceField {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct SubmitOfferRequest {
    pub price: PriceField,
    pub message: Option<String>,
    pub move_in_date: Option<NaiveDate>,
}

pub async fn submit_offer(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Json(body): Json<SubmitOfferRequest>,
) -> Result<(StatusCode, Json<OfferResponse>), MarketplaceError> {
    let usecase = SubmitOfferUseCase {
        properties: state.property_repo(),
        offers: state.offer_repo(),
    };
    let offer = usecase
        .execute(
            &user,
            property_id,
            SubmitOfferInput {
                price: body.price.into_string(),
                message: body.message,
                move_in_date: body.move_in_date,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(offer.into())))
}

// ── GET /properties/{id}/offers ──────────────────────────────────────────────

pub async fn list_property_offers(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<OfferResponse>>, MarketplaceError> {
    let usecase = ListPropertyOffersUseCase {
        properties: state.property_repo(),
        offers: state.offer_repo(),
    };
    let offers = usecase.execute(&user, property_id).await?;
    Ok(Json(offers.into_iter().map(OfferResponse::from).collect()))
}

// ── GET /offers/mine ─────────────────────────────────────────────────────────

pub async fn list_my_offers(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OfferResponse>>, MarketplaceError> {
    let usecase = ListMyOffersUseCase {
        offers: state.offer_repo(),
    };
    let offers = usecase.execute(user.id).await?;
    Ok(Json(offers.into_iter().map(OfferResponse::from).collect()))
}

// ── PATCH /offers/{id}/status ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub async fn update_offer_status(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(offer_id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<OfferResponse>, MarketplaceError> {
    let usecase = UpdateOfferStatusUseCase {
        properties: state.property_repo(),
        offers: state.offer_repo(),
        bookings: state.booking_repo(),
    };
    let offer = usecase.execute(&user, offer_id, &body.status).await?;
    Ok(Json(offer.into()))
}

// ── POST /offers/{id}/cancel ─────────────────────────────────────────────────

pub async fn cancel_offer(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<OfferResponse>, MarketplaceError> {
    let usecase = CancelOfferUseCase {
        properties: state.property_repo(),
        offers: state.offer_repo(),
    };
    let offer = usecase.execute(&user, offer_id).await?;
    Ok(Json(offer.into()))
}
