use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::repository::{BookingRepository, OfferRepository, PropertyRepository};
use crate::domain::types::{
    Notification, NotificationKind, Offer, OfferStatus, Property, User, validate_offer_price,
};
use crate::domain::workflow::plan_offer_status_change;
use crate::error::MarketplaceError;

async fn load_property<P: PropertyRepository>(
    properties: &P,
    id: Uuid,
) -> Result<Property, MarketplaceError> {
    properties
        .find_by_id(id)
        .await?
        .ok_or(MarketplaceError::PropertyNotFound)
}

// ── SubmitOffer ──────────────────────────────────────────────────────────────

pub struct SubmitOfferInput {
    pub price: String,
    pub message: Option<String>,
    pub move_in_date: Option<NaiveDate>,
}

pub struct SubmitOfferUseCase<P: PropertyRepository, O: OfferRepository> {
    pub properties: P,
    pub offers: O,
}

impl<P: PropertyRepository, O: OfferRepository> SubmitOfferUseCase<P, O> {
    pub async fn execute(
        &self,
        actor: &User,
        property_id: Uuid,
        input: SubmitOfferInput,
    ) -> Result<Offer, MarketplaceError> {
        let property = load_property(&self.properties, property_id).await?;
        if property.owner_id == actor.id {
            return Err(MarketplaceError::Forbidden);
        }
        let price = input.price.trim();
        if !validate_offer_price(price) {
            return Err(MarketplaceError::invalid(
                "price must be a positive decimal number",
            ));
        }
        if self
            .offers
            .find_pending(property.id, actor.id)
            .await?
            .is_some()
        {
            return Err(MarketplaceError::DuplicateOffer);
        }

        let now = Utc::now();
        let offer = Offer {
            id: Uuid::now_v7(),
            property_id: property.id,
            user_id: actor.id,
            price: price.to_owned(),
            message: input.message.filter(|m| !m.trim().is_empty()),
            move_in_date: input.move_in_date,
            status: OfferStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let notification = Notification::new(
            property.owner_id,
            Some(actor.id),
            NotificationKind::Offer,
            "New Offer",
            format!(
                "{} offered {} for \"{}\".",
                actor.name, offer.price, property.title
            ),
            Some(format!("/properties/{}", property.id)),
            now,
        );
        self.offers.create(&offer, &notification).await?;
        tracing::info!(offer_id = %offer.id, property_id = %property.id, "offer submitted");
        Ok(offer)
    }
}

// ── ListPropertyOffers ───────────────────────────────────────────────────────

pub struct ListPropertyOffersUseCase<P: PropertyRepository, O: OfferRepository> {
    pub properties: P,
    pub offers: O,
}

impl<P: PropertyRepository, O: OfferRepository> ListPropertyOffersUseCase<P, O> {
    pub async fn execute(
        &self,
        actor: &User,
        property_id: Uuid,
    ) -> Result<Vec<Offer>, MarketplaceError> {
        let property = load_property(&self.properties, property_id).await?;
        if !property.is_managed_by(actor) {
            return Err(MarketplaceError::Forbidden);
        }
        self.offers.list_by_property(property.id).await
    }
}

// ── ListMyOffers ─────────────────────────────────────────────────────────────

pub struct ListMyOffersUseCase<O: OfferRepository> {
    pub offers: O,
}

impl<O: OfferRepository> ListMyOffersUseCase<O> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Offer>, MarketplaceError> {
        self.offers.list_by_user(user_id).await
    }
}

// ── CancelOffer ──────────────────────────────────────────────────────────────

pub struct CancelOfferUseCase<P: PropertyRepository, O: OfferRepository> {
    pub properties: P,
    pub offers: O,
}

impl<P: PropertyRepository, O: OfferRepository> CancelOfferUseCase<P, O> {
    pub async fn execute(&self, actor: &User, offer_id: Uuid) -> Result<Offer, MarketplaceError> {
        let mut offer = self
            .offers
            .find_by_id(offer_id)
            .await?
            .ok_or(MarketplaceError::OfferNotFound)?;
        if offer.user_id != actor.id {
            return Err(MarketplaceError::Forbidden);
        }
        if offer.status != OfferStatus::Pending {
            return Err(MarketplaceError::invalid("only pending offers can be cancelled"));
        }
        let property = load_property(&self.properties, offer.property_id).await?;

        let now = Utc::now();
        let notification = Notification::new(
            property.owner_id,
            Some(actor.id),
            NotificationKind::Offer,
            "Offer Cancelled",
            format!("{} withdrew their offer on \"{}\".", actor.name, property.title),
            Some(format!("/properties/{}", property.id)),
            now,
        );
        self.offers.cancel(offer.id, &notification, now).await?;
        offer.status = OfferStatus::Cancelled;
        offer.updated_at = now;
        Ok(offer)
    }
}

// ── UpdateOfferStatus (owner decision) ───────────────────────────────────────

pub struct UpdateOfferStatusUseCase<P, O, B>
where
    P: PropertyRepository,
    O: OfferRepository,
    B: BookingRepository,
{
    pub properties: P,
    pub offers: O,
    pub bookings: B,
}

impl<P, O, B> UpdateOfferStatusUseCase<P, O, B>
where
    P: PropertyRepository,
    O: OfferRepository,
    B: BookingRepository,
{
    pub async fn execute(
        &self,
        actor: &User,
        offer_id: Uuid,
        status: &str,
    ) -> Result<Offer, MarketplaceError> {
        let mut offer = self
            .offers
            .find_by_id(offer_id)
            .await?
            .ok_or(MarketplaceError::OfferNotFound)?;
        let property = load_property(&self.properties, offer.property_id).await?;
        let has_active_booking = self.bookings.has_active_for_offer(offer.id).await?;

        let now = Utc::now();
        let change = plan_offer_status_change(
            actor.id,
            &property,
            &offer,
            status,
            has_active_booking,
            now,
        )?;
        let rejected = self.offers.apply_status_change(&change).await?;
        tracing::info!(
            offer_id = %offer.id,
            status = change.status.as_str(),
            rejected,
            booking_created = change.booking.is_some(),
            "offer status changed"
        );

        offer.status = change.status;
        offer.updated_at = now;
        Ok(offer)
    }
}
