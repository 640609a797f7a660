use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Notification;
use crate::error::MarketplaceError;
use crate::handlers::extract::{AdminUser, CurrentUser, page_request, parse_query};
use crate::handlers::property::PageQuery;
use crate::state::AppState;
use crate::usecase::notification::{
    CountUnreadUseCase, DeleteNotificationUseCase, ListAllNotificationsUseCase,
    ListNotificationsUseCase, MarkAllReadUseCase, MarkReadUseCase, SendNotificationInput,
    SendNotificationUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms_opt")]
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            is_read: n.is_read(),
            id: n.id,
            recipient_id: n.recipient_id,
            sender_id: n.sender_id,
            kind: n.kind.as_str(),
            title: n.title,
            message: n.message,
            link: n.link,
            read_at: n.read_at,
            created_at: n.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: u64,
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct NotificationListQuery {
    pub unread: Option<bool>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

// ── GET /notifications ───────────────────────────────────────────────────────

pub async fn list_notifications(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<NotificationResponse>>, MarketplaceError> {
    let query: NotificationListQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListNotificationsUseCase {
        notifications: state.notification_repo(),
    };
    let notifications = usecase
        .execute(
            user.id,
            query.unread.unwrap_or(false),
            page_request(query.per_page, query.page),
        )
        .await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

// ── GET /notifications/unread-count ──────────────────────────────────────────

pub async fn unread_count(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, MarketplaceError> {
    let usecase = CountUnreadUseCase {
        notifications: state.notification_repo(),
    };
    let count = usecase.execute(user.id).await?;
    Ok(Json(CountResponse { count }))
}

// ── POST /notifications/{id}/read ────────────────────────────────────────────

pub async fn mark_read(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationResponse>, MarketplaceError> {
    let usecase = MarkReadUseCase {
        notifications: state.notification_repo(),
    };
    Ok(Json(usecase.execute(user.id, id).await?.into()))
}

// ── POST /notifications/read-all ─────────────────────────────────────────────

pub async fn mark_all_read(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, MarketplaceError> {
    let usecase = MarkAllReadUseCase {
        notifications: state.notification_repo(),
    };
    let count = usecase.execute(user.id).await?;
    Ok(Json(CountResponse { count }))
}

// ── POST /admin/notifications ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendNotificationRequest {
    #[serde(default)]
    pub recipient_ids: Vec<Uuid>,
    #[serde(default)]
    pub broadcast: bool,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

#[derive(Serialize)]
pub struct SentResponse {
    pub sent: usize,
}

pub async fn send_notification(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(body): Json<SendNotificationRequest>,
) -> Result<(StatusCode, Json<SentResponse>), MarketplaceError> {
    let usecase = SendNotificationUseCase {
        notifications: state.notification_repo(),
        users: state.user_repo(),
    };
    let sent = usecase
        .execute(
            &admin,
            SendNotificationInput {
                recipient_ids: body.recipient_ids,
                broadcast: body.broadcast,
                title: body.title,
                message: body.message,
                link: body.link,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(SentResponse { sent })))
}

// ── GET /admin/notifications ─────────────────────────────────────────────────

pub async fn list_all_notifications(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<NotificationResponse>>, MarketplaceError> {
    let query: PageQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListAllNotificationsUseCase {
        notifications: state.notification_repo(),
    };
    let notifications = usecase
        .execute(page_request(query.per_page, query.page))
        .await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

// ── DELETE /admin/notifications/{id} ─────────────────────────────────────────

pub async fn delete_notification(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = DeleteNotificationUseCase {
        notifications: state.notification_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
