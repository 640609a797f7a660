#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use roomshare_domain::pagination::PageRequest;

use crate::domain::types::{
    Booking, BookingStatus, Category, Notification, Offer, ProfileChanges, Property,
    PropertyFilter, PropertySortBy, Rating, RatingSummary, User,
};
use crate::domain::workflow::{OfferStatusChange, RatingSubmission};
use crate::error::MarketplaceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError>;
    /// Fails with `EmailTaken` when the e-mail is already registered.
    async fn create(&self, user: &User) -> Result<(), MarketplaceError>;
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, MarketplaceError>;
    /// Admin listing; `search` matches name or e-mail, case-insensitively.
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketplaceError>;
    async fn list_ids(&self) -> Result<Vec<Uuid>, MarketplaceError>;
    /// Delete a user and everything they own. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for listed properties.
pub trait PropertyRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, MarketplaceError>;
    async fn create(&self, property: &Property) -> Result<(), MarketplaceError>;
    /// Write the owner-editable fields. The rating aggregate is left alone.
    async fn update(&self, property: &Property) -> Result<(), MarketplaceError>;
    /// Delete a property with its offers, bookings, ratings and favorites.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
    async fn search(
        &self,
        filter: &PropertyFilter,
        sort_by: PropertySortBy,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError>;
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError>;
}

/// Repository for property categories.
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, MarketplaceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, MarketplaceError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, MarketplaceError>;
    async fn create(&self, category: &Category) -> Result<(), MarketplaceError>;
    async fn update(&self, category: &Category) -> Result<(), MarketplaceError>;
    /// Fails with `CategoryInUse` while properties reference the category.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for rental offers.
pub trait OfferRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Offer>, MarketplaceError>;
    async fn find_pending(
        &self,
        property_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Offer>, MarketplaceError>;
    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<Offer>, MarketplaceError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Offer>, MarketplaceError>;
    /// Insert a pending offer and the owner's notification atomically.
    async fn create(
        &self,
        offer: &Offer,
        notification: &Notification,
    ) -> Result<(), MarketplaceError>;
    /// Mark the offer cancelled and notify the owner atomically. Fails with
    /// `OfferChanged` unless the offer is still pending.
    async fn cancel(
        &self,
        offer_id: Uuid,
        notification: &Notification,
        now: DateTime<Utc>,
    ) -> Result<(), MarketplaceError>;
    /// Commit an owner decision in a single transaction.
    ///
    /// Fails with `OfferChanged` when the offer no longer has
    /// `expected_status`. An acceptance rejects the offers pending on the
    /// property at commit time and notifies their requesters. Returns how
    /// many offers were rejected that way.
    async fn apply_status_change(
        &self,
        change: &OfferStatusChange,
    ) -> Result<u64, MarketplaceError>;
}

/// Repository for bookings.
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, MarketplaceError>;
    /// Whether a non-cancelled booking references the offer.
    async fn has_active_for_offer(&self, offer_id: Uuid) -> Result<bool, MarketplaceError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, MarketplaceError>;
    /// Bookings on properties owned by `owner_id`.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, MarketplaceError>;
    async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        notification: &Notification,
        now: DateTime<Utc>,
    ) -> Result<(), MarketplaceError>;
}

/// Repository for ratings and the property aggregate derived from them.
///
/// Every write recomputes the property's `rating_avg`/`rating_count` from all
/// of its ratings inside the same transaction.
pub trait RatingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, MarketplaceError>;
    async fn find_by_booking(&self, booking_id: Uuid)
    -> Result<Option<Rating>, MarketplaceError>;
    async fn list(&self, page: PageRequest) -> Result<Vec<Rating>, MarketplaceError>;
    /// Fails with `DuplicateRating` when a new rating races an existing one.
    async fn submit(
        &self,
        submission: &RatingSubmission,
    ) -> Result<RatingSummary, MarketplaceError>;
    async fn amend(&self, rating: &Rating) -> Result<RatingSummary, MarketplaceError>;
    async fn remove(&self, rating: &Rating) -> Result<RatingSummary, MarketplaceError>;
}

/// Repository for user favorites.
pub trait FavoriteRepository: Send + Sync {
    /// Flip the favorite flag. Returns the new state.
    async fn toggle(
        &self,
        user_id: Uuid,
        property_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, MarketplaceError>;
    async fn list_properties(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError>;
}

/// Repository for notifications.
pub trait NotificationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, MarketplaceError>;
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Vec<Notification>, MarketplaceError>;
    async fn count_unread(&self, user_id: Uuid) -> Result<u64, MarketplaceError>;
    /// Set `read_at` if still unread.
    async fn mark_read(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), MarketplaceError>;
    /// Returns the number of notifications that changed.
    async fn mark_all_read(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, MarketplaceError>;
    async fn create_many(&self, notifications: &[Notification]) -> Result<(), MarketplaceError>;
    async fn list_all(&self, page: PageRequest) -> Result<Vec<Notification>, MarketplaceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Storage for uploaded files served under the public URL prefix.
pub trait FileStore: Send + Sync {
    /// Persist `bytes` and return the public URL.
    async fn save(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, MarketplaceError>;
}
