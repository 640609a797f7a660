use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{BookingRepository, PropertyRepository};
use crate::domain::types::{Booking, BookingStatus, Notification, NotificationKind, User};
use crate::error::MarketplaceError;

// ── ListBookings ─────────────────────────────────────────────────────────────

pub struct ListBookingsUseCase<B: BookingRepository> {
    pub bookings: B,
}

impl<B: BookingRepository> ListBookingsUseCase<B> {
    /// Bookings where the user is the renter, or the owner when `as_owner`.
    pub async fn execute(
        &self,
        user_id: Uuid,
        as_owner: bool,
    ) -> Result<Vec<Booking>, MarketplaceError> {
        if as_owner {
            self.bookings.list_by_owner(user_id).await
        } else {
            self.bookings.list_by_user(user_id).await
        }
    }
}

// ── GetBooking ───────────────────────────────────────────────────────────────

pub struct GetBookingUseCase<B: BookingRepository, P: PropertyRepository> {
    pub bookings: B,
    pub properties: P,
}

impl<B: BookingRepository, P: PropertyRepository> GetBookingUseCase<B, P> {
    pub async fn execute(&self, actor: &User, id: Uuid) -> Result<Booking, MarketplaceError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::BookingNotFound)?;
        if booking.user_id == actor.id || actor.is_admin {
            return Ok(booking);
        }
        let owns_property = self
            .properties
            .find_by_id(booking.property_id)
            .await?
            .is_some_and(|p| p.owner_id == actor.id);
        if !owns_property {
            return Err(MarketplaceError::Forbidden);
        }
        Ok(booking)
    }
}

// ── UpdateBookingStatus ──────────────────────────────────────────────────────

pub struct UpdateBookingStatusUseCase<B: BookingRepository, P: PropertyRepository> {
    pub bookings: B,
    pub properties: P,
}

impl<B: BookingRepository, P: PropertyRepository> UpdateBookingStatusUseCase<B, P> {
    /// Renter may cancel; owner may complete or cancel; admin may do either.
    /// Cancelled is terminal and completed cannot be cancelled.
    pub async fn execute(
        &self,
        actor: &User,
        id: Uuid,
        status: &str,
    ) -> Result<Booking, MarketplaceError> {
        let target = BookingStatus::parse(status)
            .ok_or_else(|| MarketplaceError::InvalidStatus(status.to_owned()))?;
        let mut booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::BookingNotFound)?;
        let property = self
            .properties
            .find_by_id(booking.property_id)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)?;

        let is_renter = booking.user_id == actor.id;
        let is_owner = property.owner_id == actor.id;
        if !(is_renter || is_owner || actor.is_admin) {
            return Err(MarketplaceError::Forbidden);
        }
        if target == booking.status {
            return Ok(booking);
        }
        match (booking.status, target) {
            (BookingStatus::Cancelled, _) => {
                return Err(MarketplaceError::invalid("booking has been cancelled"));
            }
            (BookingStatus::Completed, _) => {
                return Err(MarketplaceError::invalid("booking is already completed"));
            }
            (_, BookingStatus::Confirmed) => {
                return Err(MarketplaceError::InvalidStatus(status.to_owned()));
            }
            (_, BookingStatus::Completed) if !(is_owner || actor.is_admin) => {
                return Err(MarketplaceError::Forbidden);
            }
            _ => {}
        }

        let (recipient, title) = match (is_renter, target) {
            (true, BookingStatus::Cancelled) => (property.owner_id, "Booking Cancelled"),
            (false, BookingStatus::Cancelled) => (booking.user_id, "Booking Cancelled"),
            (true, _) => (property.owner_id, "Booking Completed"),
            (false, _) => (booking.user_id, "Booking Completed"),
        };
        let now = Utc::now();
        let notification = Notification::new(
            recipient,
            Some(actor.id),
            NotificationKind::Booking,
            title,
            format!(
                "The booking for \"{}\" is now {}.",
                property.title,
                target.as_str()
            ),
            Some(format!("/bookings/{}", booking.id)),
            now,
        );
        self.bookings
            .update_status(booking.id, target, &notification, now)
            .await?;

        booking.status = target;
        booking.updated_at = now;
        Ok(booking)
    }
}
