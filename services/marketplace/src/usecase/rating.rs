use chrono::Utc;
use uuid::Uuid;

use roomshare_domain::pagination::PageRequest;

use crate::domain::repository::{BookingRepository, PropertyRepository, RatingRepository};
use crate::domain::types::{Rating, RatingSummary, User, validate_score};
use crate::domain::workflow::plan_rating;
use crate::error::MarketplaceError;

pub struct RatingOutcome {
    pub rating: Rating,
    pub created: bool,
    pub summary: RatingSummary,
}

// ── SubmitRating ─────────────────────────────────────────────────────────────

pub struct SubmitRatingUseCase<B, P, R>
where
    B: BookingRepository,
    P: PropertyRepository,
    R: RatingRepository,
{
    pub bookings: B,
    pub properties: P,
    pub ratings: R,
}

impl<B, P, R> SubmitRatingUseCase<B, P, R>
where
    B: BookingRepository,
    P: PropertyRepository,
    R: RatingRepository,
{
    pub async fn execute(
        &self,
        actor: &User,
        booking_id: Uuid,
        score: i64,
        comment: Option<String>,
    ) -> Result<RatingOutcome, MarketplaceError> {
        validate_score(score).ok_or(MarketplaceError::InvalidScore)?;
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(MarketplaceError::BookingNotFound)?;
        let property = self
            .properties
            .find_by_id(booking.property_id)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)?;
        let existing = self.ratings.find_by_booking(booking.id).await?;

        let comment = comment.filter(|c| !c.trim().is_empty());
        let submission = plan_rating(
            actor.id,
            &booking,
            &property,
            existing.as_ref(),
            score,
            comment,
            Utc::now(),
        )?;
        let summary = self.ratings.submit(&submission).await?;
        Ok(RatingOutcome {
            rating: submission.rating,
            created: submission.created,
            summary,
        })
    }
}

// ── Admin moderation ─────────────────────────────────────────────────────────

pub struct ListRatingsUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> ListRatingsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Rating>, MarketplaceError> {
        self.ratings.list(page).await
    }
}

pub struct AmendRatingInput {
    pub score: Option<i64>,
    pub comment: Option<String>,
}

pub struct AmendRatingUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> AmendRatingUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: AmendRatingInput,
    ) -> Result<RatingOutcome, MarketplaceError> {
        let score = input
            .score
            .map(|s| validate_score(s).ok_or(MarketplaceError::InvalidScore))
            .transpose()?;
        let mut rating = self
            .ratings
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::RatingNotFound)?;
        if let Some(score) = score {
            rating.score = score;
        }
        if let Some(comment) = input.comment {
            rating.comment = Some(comment).filter(|c| !c.trim().is_empty());
        }
        rating.updated_at = Utc::now();
        let summary = self.ratings.amend(&rating).await?;
        Ok(RatingOutcome {
            rating,
            created: false,
            summary,
        })
    }
}

pub struct DeleteRatingUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> DeleteRatingUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<RatingSummary, MarketplaceError> {
        let rating = self
            .ratings
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::RatingNotFound)?;
        self.ratings.remove(&rating).await
    }
}
