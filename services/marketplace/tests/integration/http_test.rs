use std::sync::Arc;

use axum::http::{StatusCode, header};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};
use uuid::Uuid;

use roomshare_auth_types::cookie::CookieSettings;
use roomshare_auth_types::session::SessionKey;
use roomshare_marketplace::infra::storage::LocalFileStore;
use roomshare_marketplace::router::build_router;
use roomshare_marketplace::state::AppState;
use roomshare_marketplace_schema::{categories, properties, users};
use roomshare_testing::auth::{MockSession, TEST_SESSION_SECRET};

fn public_dir() -> std::path::PathBuf {
    std::env::temp_dir().join("roomshare-test")
}

fn server(db: DatabaseConnection) -> TestServer {
    let state = AppState {
        db: Arc::new(db),
        session_key: SessionKey::new(TEST_SESSION_SECRET),
        cookies: CookieSettings::default(),
        files: LocalFileStore::new(public_dir(), "/uploads"),
        max_upload_bytes: 1024 * 1024,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn user_row(id: Uuid, is_admin: bool) -> users::Model {
    let now = Utc::now();
    users::Model {
        id,
        name: "Tess".to_owned(),
        email: "tess@example.com".to_owned(),
        password_hash: String::new(),
        phone: None,
        avatar_url: None,
        bio: None,
        is_admin,
        created_at: now,
        updated_at: now,
    }
}

fn property_row(id: Uuid, owner_id: Uuid) -> properties::Model {
    let now = Utc::now();
    properties::Model {
        id,
        owner_id,
        category_id: Uuid::now_v7(),
        title: "Attic room".to_owned(),
        description: String::new(),
        address: "9 Hill Lane".to_owned(),
        city: "Bristol".to_owned(),
        latitude: None,
        longitude: None,
        price: 650.0,
        bedrooms: 1,
        bathrooms: 1,
        area: None,
        images: json!(["/uploads/attic.jpg"]),
        is_available: true,
        rating_avg: 0.0,
        rating_count: 0,
        created_at: now,
        updated_at: now,
    }
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_liveness() {
    let server = server(empty_db());

    let response = server.get("/healthz").await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_session_cookie() {
    let server = server(empty_db());

    let response = server.get("/users/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_reject_session_of_deleted_user() {
    let user_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();
    let server = server(db);

    let response = server
        .get("/users/me")
        .add_header(header::COOKIE, MockSession::member(user_id).cookie_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_return_current_user_profile() {
    let user_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(user_id, false)]])
        .into_connection();
    let server = server(db);

    let response = server
        .get("/users/me")
        .add_header(header::COOKIE, MockSession::member(user_id).cookie_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["email"], "tess@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn should_forbid_member_on_admin_routes() {
    let user_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(user_id, false)]])
        .into_connection();
    let server = server(db);

    let response = server
        .get("/admin/users")
        .add_header(header::COOKIE, MockSession::member(user_id).cookie_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_use_stored_admin_flag_over_token_role() {
    let user_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(user_id, false)]])
        .into_connection();
    let server = server(db);

    let response = server
        .get("/admin/ratings")
        .add_header(header::COOKIE, MockSession::admin(user_id).cookie_header())
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

// ── Offers / ratings ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_offer_on_own_property() {
    let user_id = Uuid::now_v7();
    let property_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(user_id, false)]])
        .append_query_results([vec![property_row(property_id, user_id)]])
        .into_connection();
    let server = server(db);

    let response = server
        .post(&format!("/properties/{property_id}/offers"))
        .add_header(header::COOKIE, MockSession::member(user_id).cookie_header())
        .json(&json!({ "price": "500" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_reject_out_of_range_score() {
    let user_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(user_id, false)]])
        .into_connection();
    let server = server(db);

    let response = server
        .post(&format!("/bookings/{}/rating", Uuid::now_v7()))
        .add_header(header::COOKIE, MockSession::member(user_id).cookie_header())
        .json(&json!({ "score": 7 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_SCORE");
}

#[tokio::test]
async fn should_reject_out_of_range_score_on_admin_amend() {
    let admin_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(admin_id, true)]])
        .into_connection();
    let server = server(db);

    let response = server
        .patch(&format!("/admin/ratings/{}", Uuid::now_v7()))
        .add_header(header::COOKIE, MockSession::admin(admin_id).cookie_header())
        .json(&json!({ "score": 0 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_non_integer_scores_as_invalid_score() {
    for score in [json!(5.5), json!(1e20), json!("3")] {
        let user_id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(user_id, false)]])
            .into_connection();
        let server = server(db);

        let response = server
            .post(&format!("/bookings/{}/rating", Uuid::now_v7()))
            .add_header(header::COOKIE, MockSession::member(user_id).cookie_header())
            .json(&json!({ "score": score }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "score {score}");
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "INVALID_SCORE");
    }
}

#[tokio::test]
async fn should_reject_non_integer_scores_on_admin_amend() {
    for score in [json!(5.5), json!(1e20)] {
        let admin_id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(admin_id, true)]])
            .into_connection();
        let server = server(db);

        let response = server
            .patch(&format!("/admin/ratings/{}", Uuid::now_v7()))
            .add_header(header::COOKIE, MockSession::admin(admin_id).cookie_header())
            .json(&json!({ "score": score }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "score {score}");
        let body: Value = response.json();
        assert_eq!(body["kind"], "INVALID_SCORE");
    }
}

// ── Uploads ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_html_upload() {
    let user_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(user_id, false)]])
        .into_connection();
    let server = server(db);
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"<script>alert(1)</script>".as_slice())
            .file_name("x.html")
            .mime_type("text/html"),
    );

    let response = server
        .post("/uploads")
        .add_header(header::COOKIE, MockSession::member(user_id).cookie_header())
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_INPUT");
}

#[tokio::test]
async fn should_serve_uploads_with_nosniff() {
    let dir = public_dir().join("uploads");
    std::fs::create_dir_all(&dir).unwrap();
    let name = format!("{}.png", Uuid::now_v7());
    std::fs::write(dir.join(&name), b"\x89PNG").unwrap();
    let server = server(empty_db());

    let response = server.get(&format!("/uploads/{name}")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header(header::X_CONTENT_TYPE_OPTIONS), "nosniff");
    std::fs::remove_file(dir.join(&name)).unwrap();
}

// ── Public reads ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_categories_without_session() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![categories::Model {
            id: Uuid::now_v7(),
            name: "Apartment".to_owned(),
            description: None,
            icon_url: None,
            created_at: Utc::now(),
        }]])
        .into_connection();
    let server = server(db);

    let response = server.get("/categories").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body[0]["name"], "Apartment");
}

#[tokio::test]
async fn should_return_not_found_for_missing_property() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<properties::Model>::new()])
        .into_connection();
    let server = server(db);

    let response = server.get(&format!("/properties/{}", Uuid::now_v7())).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["kind"], "PROPERTY_NOT_FOUND");
}

#[tokio::test]
async fn should_reject_unknown_sort_order() {
    let server = server(empty_db());

    let response = server.get("/properties?sort-by=cheapest").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
