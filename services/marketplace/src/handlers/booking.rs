use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Booking;
use crate::error::MarketplaceError;
use crate::handlers::extract::{CurrentUser, json_score, parse_query};
use crate::handlers::offer::StatusRequest;
use crate::handlers::rating::RatingOutcomeResponse;
use crate::state::AppState;
use crate::usecase::booking::{
    GetBookingUseCase, ListBookingsUseCase, UpdateBookingStatusUseCase,
};
use crate::usecase::rating::SubmitRatingUseCase;

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub status: &'static str,
    pub start_date: Option<NaiveDate>,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            offer_id: b.offer_id,
            property_id: b.property_id,
            user_id: b.user_id,
            status: b.status.as_str(),
            start_date: b.start_date,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

// ── GET /bookings ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct BookingListQuery {
    /// `owner` lists bookings on the caller's properties.
    #[serde(rename = "as")]
    pub as_role: Option<String>,
}

pub async fn list_bookings(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<BookingResponse>>, MarketplaceError> {
    let query: BookingListQuery = parse_query(raw_query.as_deref())?;
    let as_owner = match query.as_role.as_deref() {
        None | Some("renter") => false,
        Some("owner") => true,
        Some(other) => {
            return Err(MarketplaceError::invalid(format!(
                "unknown booking view: {other}"
            )));
        }
    };
    let usecase = ListBookingsUseCase {
        bookings: state.booking_repo(),
    };
    let bookings = usecase.execute(user.id, as_owner).await?;
    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}

// ── GET /bookings/{id} ───────────────────────────────────────────────────────

pub async fn get_booking(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, MarketplaceError> {
    let usecase = GetBookingUseCase {
        bookings: state.booking_repo(),
        properties: state.property_repo(),
    };
    Ok(Json(usecase.execute(&user, id).await?.into()))
}

// ── PATCH /bookings/{id}/status ──────────────────────────────────────────────

pub async fn update_booking_status(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<BookingResponse>, MarketplaceError> {
    let usecase = UpdateBookingStatusUseCase {
        bookings: state.booking_repo(),
        properties: state.property_repo(),
    };
    let booking = usecase.execute(&user, id, &body.status).await?;
    Ok(Json(booking.into()))
}

// ── POST /bookings/{id}/rating ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitRatingRequest {
    /// Raw JSON; `json_score` turns anything but an integer into `INVALID_SCORE`.
    #[serde(default)]
    pub score: serde_json::Value,
    pub comment: Option<String>,
}

pub async fn submit_rating(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<RatingOutcomeResponse>), MarketplaceError> {
    let score = json_score(&body.score)?;
    let usecase = SubmitRatingUseCase {
        bookings: state.booking_repo(),
        properties: state.property_repo(),
        ratings: state.rating_repo(),
    };
    let outcome = usecase
        .execute(&user, booking_id, score, body.comment)
        .await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into())))
}
