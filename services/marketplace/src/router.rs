use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::{get, patch, post},
};
use tower_http::{
    limit::RequestBodyLimitLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
};

use roomshare_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    auth::{login, logout, register},
    booking::{get_booking, list_bookings, submit_rating, update_booking_status},
    category::{create_category, delete_category, get_category, list_categories, update_category},
    favorite::{list_favorites, toggle_favorite},
    health::{healthz, readyz},
    notification::{
        delete_notification, list_all_notifications, list_notifications, mark_all_read,
        mark_read, send_notification, unread_count,
    },
    offer::{
        cancel_offer, list_my_offers, list_property_offers, submit_offer, update_offer_status,
    },
    property::{
        create_property, delete_property, get_property, list_my_properties, search_properties,
        update_property,
    },
    rating::{amend_rating, delete_rating, list_ratings},
    upload::upload_file,
    user::{delete_user, get_me, list_users, update_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let uploads = format!("{}/{{*path}}", state.files.url_prefix());
    let static_files = ServeDir::new(state.files.public_dir());
    let max_body = state.max_upload_bytes;

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        // Users
        .route("/users/me", get(get_me).patch(update_me))
        // Properties
        .route("/properties", get(search_properties).post(create_property))
        .route("/properties/mine", get(list_my_properties))
        .route(
            "/properties/{id}",
            get(get_property)
                .patch(update_property)
                .delete(delete_property),
        )
        .route(
            "/properties/{id}/offers",
            get(list_property_offers).post(submit_offer),
        )
        .route("/properties/{id}/favorite", post(toggle_favorite))
        // Offers
        .route("/offers/mine", get(list_my_offers))
        .route("/offers/{id}/status", patch(update_offer_status))
        .route("/offers/{id}/cancel", post(cancel_offer))
        // Bookings
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/status", patch(update_booking_status))
        .route("/bookings/{id}/rating", post(submit_rating))
        // Categories
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
        // Favorites
        .route("/favorites", get(list_favorites))
        // Notifications
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}/read", post(mark_read))
        // Uploads
        .route("/uploads", post(upload_file))
        .route_service(&uploads, static_files)
        // Admin
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", axum::routing::delete(delete_user))
        .route("/admin/categories", post(create_category))
        .route(
            "/admin/categories/{id}",
            patch(update_category).delete(delete_category),
        )
        .route("/admin/ratings", get(list_ratings))
        .route(
            "/admin/ratings/{id}",
            patch(amend_rating).delete(delete_rating),
        )
        .route(
            "/admin/notifications",
            get(list_all_notifications).post(send_notification),
        )
        .route(
            "/admin/notifications/{id}",
            axum::routing::delete(delete_notification),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(trace_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
