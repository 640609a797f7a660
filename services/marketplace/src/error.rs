use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use roomshare_auth_types::session::SessionRejection;
use roomshare_core::error::ApiError;

/// Marketplace service error variants.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error(transparent)]
    Session(#[from] SessionRejection),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("property not found")]
    PropertyNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("offer not found")]
    OfferNotFound,
    #[error("booking not found")]
    BookingNotFound,
    #[error("rating not found")]
    RatingNotFound,
    #[error("notification not found")]
    NotificationNotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("category name already exists")]
    CategoryNameTaken,
    #[error("category is used by existing properties")]
    CategoryInUse,
    #[error("a pending offer for this property already exists")]
    DuplicateOffer,
    #[error("offer was changed by another request")]
    OfferChanged,
    #[error("booking has already been rated")]
    DuplicateRating,
    #[error("score must be between 1 and 5")]
    InvalidScore,
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl ApiError for MarketplaceError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Session(rejection) => rejection.status(),
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::PropertyNotFound
            | Self::CategoryNotFound
            | Self::OfferNotFound
            | Self::BookingNotFound
            | Self::RatingNotFound
            | Self::NotificationNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken
            | Self::CategoryNameTaken
            | Self::CategoryInUse
            | Self::DuplicateOffer
            | Self::OfferChanged
            | Self::DuplicateRating => StatusCode::CONFLICT,
            Self::InvalidScore | Self::InvalidStatus(_) | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Session(rejection) => rejection.kind(),
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PropertyNotFound => "PROPERTY_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::OfferNotFound => "OFFER_NOT_FOUND",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::RatingNotFound => "RATING_NOT_FOUND",
            Self::NotificationNotFound => "NOTIFICATION_NOT_FOUND",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::CategoryNameTaken => "CATEGORY_NAME_TAKEN",
            Self::CategoryInUse => "CATEGORY_IN_USE",
            Self::DuplicateOffer => "DUPLICATE_OFFER",
            Self::OfferChanged => "OFFER_CHANGED",
            Self::DuplicateRating => "DUPLICATE_RATING",
            Self::InvalidScore => "INVALID_SCORE",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        self.to_response()
    }
}
