//! Pure planners for the multi-write flows.
//!
//! Each planner checks every failure condition and returns the complete set
//! of writes; repositories commit a plan in one transaction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    Booking, BookingStatus, Notification, NotificationKind, Offer, OfferStatus, Property, Rating,
    validate_score,
};
use crate::error::MarketplaceError;

/// Writes produced by an owner deciding on an offer.
#[derive(Debug, Clone)]
pub struct OfferStatusChange {
    pub offer_id: Uuid,
    pub property_id: Uuid,
    pub property_title: String,
    pub decided_by: Uuid,
    /// Status the decision was taken against. The commit fails with
    /// `OfferChanged` if the offer has moved on since.
    pub expected_status: OfferStatus,
    pub status: OfferStatus,
    /// Reject every other offer still pending on the property at commit time.
    pub reject_competing: bool,
    /// Present when a booking must be created for the accepted offer.
    pub booking: Option<Booking>,
    pub notifications: Vec<Notification>,
    pub now: DateTime<Utc>,
}

impl OfferStatusChange {
    /// Notice for the requester of a competing offer rejected by this acceptance.
    pub fn competing_rejection(&self, requester_id: Uuid) -> Notification {
        Notification::new(
            requester_id,
            Some(self.decided_by),
            NotificationKind::Offer,
            "Offer Rejected",
            format!(
                "Your offer on \"{}\" was declined because another offer was accepted.",
                self.property_title
            ),
            Some(format!("/properties/{}", self.property_id)),
            self.now,
        )
    }
}

/// Plan the owner's status decision on `offer`.
///
/// `has_active_booking` tells whether a non-cancelled booking already
/// references `offer`.
pub fn plan_offer_status_change(
    actor_id: Uuid,
    property: &Property,
    offer: &Offer,
    requested_status: &str,
    has_active_booking: bool,
    now: DateTime<Utc>,
) -> Result<OfferStatusChange, MarketplaceError> {
    if property.owner_id != actor_id {
        return Err(MarketplaceError::Forbidden);
    }
    let status = match OfferStatus::parse(requested_status) {
        Some(s @ (OfferStatus::Accepted | OfferStatus::Rejected)) => s,
        _ => return Err(MarketplaceError::InvalidStatus(requested_status.to_owned())),
    };
    if offer.status == OfferStatus::Cancelled {
        return Err(MarketplaceError::invalid("offer has been cancelled"));
    }

    let changed = offer.status != status;
    let mut change = OfferStatusChange {
        offer_id: offer.id,
        property_id: property.id,
        property_title: property.title.clone(),
        decided_by: actor_id,
        expected_status: offer.status,
        status,
        reject_competing: status == OfferStatus::Accepted,
        booking: None,
        notifications: Vec::new(),
        now,
    };

    match status {
        OfferStatus::Accepted => {
            if changed {
                change.notifications.push(Notification::new(
                    offer.user_id,
                    Some(actor_id),
                    NotificationKind::Offer,
                    "Offer Accepted!",
                    format!("Your offer on \"{}\" has been accepted.", property.title),
                    Some("/bookings".to_owned()),
                    now,
                ));
            }
            if !has_active_booking {
                change.booking = Some(Booking {
                    id: Uuid::now_v7(),
                    offer_id: offer.id,
                    property_id: property.id,
                    user_id: offer.user_id,
                    status: BookingStatus::Confirmed,
                    start_date: offer.move_in_date,
                    created_at: now,
                    updated_at: now,
                });
            }
        }
        _ => {
            if changed {
                change.notifications.push(Notification::new(
                    offer.user_id,
                    Some(actor_id),
                    NotificationKind::Offer,
                    "Offer Rejected",
                    format!("Your offer on \"{}\" was declined.", property.title),
                    Some(format!("/properties/{}", property.id)),
                    now,
                ));
            }
        }
    }

    Ok(change)
}

/// Writes produced by a renter rating their booking.
#[derive(Debug, Clone)]
pub struct RatingSubmission {
    /// The rating row to upsert (keyed by booking).
    pub rating: Rating,
    /// `true` when no rating existed for the booking before.
    pub created: bool,
    /// Booking to move to `completed`.
    pub complete_booking: Option<Uuid>,
    pub notification: Option<Notification>,
}

/// Plan a rating for `booking`. `existing` is the booking's current rating.
pub fn plan_rating(
    actor_id: Uuid,
    booking: &Booking,
    property: &Property,
    existing: Option<&Rating>,
    score: i64,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> Result<RatingSubmission, MarketplaceError> {
    let score = validate_score(score).ok_or(MarketplaceError::InvalidScore)?;
    if booking.user_id != actor_id {
        return Err(MarketplaceError::Forbidden);
    }
    if !booking.status.is_rateable() {
        return Err(MarketplaceError::invalid(
            "only confirmed or completed bookings can be rated",
        ));
    }

    if let Some(existing) = existing {
        return Ok(RatingSubmission {
            rating: Rating {
                score,
                comment,
                updated_at: now,
                ..existing.clone()
            },
            created: false,
            complete_booking: None,
            notification: None,
        });
    }

    let first_for_confirmed = booking.status == BookingStatus::Confirmed;
    Ok(RatingSubmission {
        rating: Rating {
            id: Uuid::now_v7(),
            booking_id: booking.id,
            property_id: booking.property_id,
            user_id: actor_id,
            score,
            comment,
            created_at: now,
            updated_at: now,
        },
        created: true,
        complete_booking: first_for_confirmed.then_some(booking.id),
        notification: first_for_confirmed.then(|| {
            Notification::new(
                property.owner_id,
                Some(actor_id),
                NotificationKind::Rating,
                "New Rating",
                format!("\"{}\" received a {score}-star rating.", property.title),
                Some(format!("/properties/{}", property.id)),
                now,
            )
        }),
    })
}
