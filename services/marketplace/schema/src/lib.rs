//! sea-orm entities for the marketplace database.

pub mod bookings;
pub mod categories;
pub mod favorites;
pub mod notifications;
pub mod offers;
pub mod properties;
pub mod ratings;
pub mod users;
