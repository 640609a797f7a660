
mod auth_test;
mod booking_test;
mod http_test;
mod notification_test;
mod offer_test;
mod rating_test;
