use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use roomshare_domain::pagination::Sort;
use roomshare_domain::user::UserRole;

/// Registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> UserRole {
        UserRole::from_admin_flag(self.is_admin)
    }
}

/// Partial profile update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.avatar_url.is_none() && self.bio.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Listed property with its rolling rating aggregate.
#[derive(Debug, Clone)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: Option<f64>,
    pub images: Vec<String>,
    pub is_available: bool,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn is_managed_by(&self, user: &User) -> bool {
        self.owner_id == user.id || user.is_admin
    }
}

/// Partial property update. `None` leaves the field unchanged;
/// `Some(None)` clears an optional column.
#[derive(Debug, Clone, Default)]
pub struct PropertyChanges {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<Option<f64>>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

impl PropertyChanges {
    /// Apply onto `property`, bumping `updated_at`.
    pub fn apply(self, property: &mut Property, now: DateTime<Utc>) {
        if let Some(v) = self.category_id {
            property.category_id = v;
        }
        if let Some(v) = self.title {
            property.title = v;
        }
        if let Some(v) = self.description {
            property.description = v;
        }
        if let Some(v) = self.address {
            property.address = v;
        }
        if let Some(v) = self.city {
            property.city = v;
        }
        if let Some(v) = self.latitude {
            property.latitude = v;
        }
        if let Some(v) = self.longitude {
            property.longitude = v;
        }
        if let Some(v) = self.price {
            property.price = v;
        }
        if let Some(v) = self.bedrooms {
            property.bedrooms = v;
        }
        if let Some(v) = self.bathrooms {
            property.bathrooms = v;
        }
        if let Some(v) = self.area {
            property.area = v;
        }
        if let Some(v) = self.images {
            property.images = v;
        }
        if let Some(v) = self.is_available {
            property.is_available = v;
        }
        property.updated_at = now;
    }
}

/// Search filters for the public property listing.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    /// Case-insensitive substring over title, description and address.
    pub q: Option<String>,
    pub city: Option<String>,
    pub category_id: Option<Uuid>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<i32>,
    pub is_available: Option<bool>,
}

impl PropertyFilter {
    /// In-memory equivalent of the SQL predicate.
    pub fn matches(&self, property: &Property) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };
        if let Some(q) = self.q.as_deref() {
            if !(contains(&property.title, q)
                || contains(&property.description, q)
                || contains(&property.address, q))
            {
                return false;
            }
        }
        if let Some(city) = self.city.as_deref() {
            if !property.city.eq_ignore_ascii_case(city) {
                return false;
            }
        }
        if self.category_id.is_some_and(|id| id != property.category_id) {
            return false;
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if self.min_bedrooms.is_some_and(|min| property.bedrooms < min) {
            return false;
        }
        if self.is_available.is_some_and(|v| v != property.is_available) {
            return false;
        }
        true
    }
}

/// Sort options for property search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySortBy {
    CreatedAt(Sort),
    Price(Sort),
    RatingDesc,
    Random,
}

impl Default for PropertySortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl PropertySortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "created-at-desc" => Some(Self::CreatedAt(Sort::Desc)),
            "created-at-asc" => Some(Self::CreatedAt(Sort::Asc)),
            "price-desc" => Some(Self::Price(Sort::Desc)),
            "price-asc" => Some(Self::Price(Sort::Asc)),
            "rating-desc" => Some(Self::RatingDesc),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl OfferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Offer {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    /// Decimal string as submitted.
    pub price: String,
    pub message: Option<String>,
    pub move_in_date: Option<NaiveDate>,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Only confirmed and completed bookings can be rated.
    pub fn is_rateable(self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub status: BookingStatus,
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Rating {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Property rating aggregate, recomputed from every rating row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i32,
}

impl RatingSummary {
    pub fn from_scores(scores: &[u8]) -> Self {
        if scores.is_empty() {
            return Self {
                average: 0.0,
                count: 0,
            };
        }
        let total: u32 = scores.iter().map(|&s| s as u32).sum();
        Self {
            average: total as f64 / scores.len() as f64,
            count: scores.len() as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Offer,
    Booking,
    Rating,
    Admin,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Booking => "booking",
            Self::Rating => "rating",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "offer" => Some(Self::Offer),
            "booking" => Some(Self::Booking),
            "rating" => Some(Self::Rating),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// New unread notification.
    pub fn new(
        recipient_id: Uuid,
        sender_id: Option<Uuid>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            recipient_id,
            sender_id,
            kind,
            title: title.into(),
            message: message.into(),
            link,
            read_at: None,
            created_at: now,
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Minimal e-mail shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Rating scores are integers 1 to 5.
pub fn validate_score(score: i64) -> Option<u8> {
    (1..=5).contains(&score).then_some(score as u8)
}

/// Offer price must be a positive decimal (`"500"`, `"1250.50"`).
pub fn validate_offer_price(price: &str) -> bool {
    let price = price.trim();
    let mut parts = price.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !digits(whole) || fraction.is_some_and(|f| !digits(f)) {
        return false;
    }
    price.parse::<f64>().is_ok_and(|v| v > 0.0)
}

/// File types accepted by the upload endpoints.
pub const UPLOAD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "pdf"];

/// Lowercased extension of `file_name` when it is an accepted upload type.
pub fn upload_extension(file_name: Option<&str>) -> Option<String> {
    let (_, ext) = file_name?.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    UPLOAD_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}
