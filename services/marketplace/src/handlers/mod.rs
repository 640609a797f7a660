pub mod auth;
pub mod booking;
pub mod category;
pub mod extract;
pub mod favorite;
pub mod health;
pub mod notification;
pub mod offer;
pub mod property;
pub mod rating;
pub mod upload;
pub mod user;
