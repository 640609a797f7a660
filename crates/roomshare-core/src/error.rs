use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// An error that knows how it is rendered at the HTTP boundary.
///
/// Every body has the shape `{ "success": false, "kind": ..., "error": ... }`.
pub trait ApiError: std::fmt::Display {
    fn status(&self) -> StatusCode;

    /// Stable SCREAMING_SNAKE_CASE identifier for clients.
    fn kind(&self) -> &'static str;

    fn to_response(&self) -> Response {
        error_response(self.status(), self.kind(), self.to_string())
    }
}

/// Build the JSON error response shared by all services and extractors.
pub fn error_response(status: StatusCode, kind: &str, message: impl Into<String>) -> Response {
    let body = serde_json::json!({
        "success": false,
        "kind": kind,
        "error": message.into(),
    });
    (status, axum::Json(body)).into_response()
}
