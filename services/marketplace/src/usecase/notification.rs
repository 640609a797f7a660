use chrono::Utc;
use uuid::Uuid;

use roomshare_domain::pagination::PageRequest;

use crate::domain::repository::{NotificationRepository, UserRepository};
use crate::domain::types::{Notification, NotificationKind, User};
use crate::error::MarketplaceError;

// ── ListNotifications ────────────────────────────────────────────────────────

pub struct ListNotificationsUseCase<N: NotificationRepository> {
    pub notifications: N,
}

impl<N: NotificationRepository> ListNotificationsUseCase<N> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Vec<Notification>, MarketplaceError> {
        self.notifications
            .list_for_user(user_id, unread_only, page)
            .await
    }
}

pub struct CountUnreadUseCase<N: NotificationRepository> {
    pub notifications: N,
}

impl<N: NotificationRepository> CountUnreadUseCase<N> {
    pub async fn execute(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        self.notifications.count_unread(user_id).await
    }
}

// ── MarkRead ─────────────────────────────────────────────────────────────────

pub struct MarkReadUseCase<N: NotificationRepository> {
    pub notifications: N,
}

impl<N: NotificationRepository> MarkReadUseCase<N> {
    /// Idempotent: an already-read notification is left untouched.
    pub async fn execute(&self, user_id: Uuid, id: Uuid) -> Result<Notification, MarketplaceError> {
        let mut notification = self
            .notifications
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::NotificationNotFound)?;
        if notification.recipient_id != user_id {
            return Err(MarketplaceError::Forbidden);
        }
        if !notification.is_read() {
            let now = Utc::now();
            self.notifications.mark_read(id, now).await?;
            notification.read_at = Some(now);
        }
        Ok(notification)
    }
}

pub struct MarkAllReadUseCase<N: NotificationRepository> {
    pub notifications: N,
}

impl<N: NotificationRepository> MarkAllReadUseCase<N> {
    pub async fn execute(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        self.notifications.mark_all_read(user_id, Utc::now()).await
    }
}

// ── SendNotification (admin) ─────────────────────────────────────────────────

pub struct SendNotificationInput {
    pub recipient_ids: Vec<Uuid>,
    pub broadcast: bool,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

pub struct SendNotificationUseCase<N: NotificationRepository, U: UserRepository> {
    pub notifications: N,
    pub users: U,
}

impl<N: NotificationRepository, U: UserRepository> SendNotificationUseCase<N, U> {
    /// Returns the number of notifications created.
    pub async fn execute(
        &self,
        sender: &User,
        input: SendNotificationInput,
    ) -> Result<usize, MarketplaceError> {
        let title = input.title.trim();
        let message = input.message.trim();
        if title.is_empty() || message.is_empty() {
            return Err(MarketplaceError::invalid("title and message are required"));
        }

        let recipients = if input.broadcast {
            self.users.list_ids().await?
        } else {
            let mut ids = input.recipient_ids;
            ids.sort_unstable();
            ids.dedup();
            if ids.is_empty() {
                return Err(MarketplaceError::invalid(
                    "recipient_ids is required unless broadcast is set",
                ));
            }
            for id in &ids {
                if self.users.find_by_id(*id).await?.is_none() {
                    return Err(MarketplaceError::UserNotFound);
                }
            }
            ids
        };

        let now = Utc::now();
        let link = input.link.filter(|l| !l.trim().is_empty());
        let batch: Vec<Notification> = recipients
            .into_iter()
            .map(|recipient| {
                Notification::new(
                    recipient,
                    Some(sender.id),
                    NotificationKind::Admin,
                    title,
                    message,
                    link.clone(),
                    now,
                )
            })
            .collect();
        self.notifications.create_many(&batch).await?;
        tracing::info!(admin_id = %sender.id, count = batch.len(), "notifications sent");
        Ok(batch.len())
    }
}

// ── Admin listing / delete ───────────────────────────────────────────────────

pub struct ListAllNotificationsUseCase<N: NotificationRepository> {
    pub notifications: N,
}

impl<N: NotificationRepository> ListAllNotificationsUseCase<N> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Notification>, MarketplaceError> {
        self.notifications.list_all(page).await
    }
}

pub struct DeleteNotificationUseCase<N: NotificationRepository> {
    pub notifications: N,
}

impl<N: NotificationRepository> DeleteNotificationUseCase<N> {
    pub async fn execute(&self, id: Uuid) -> Result<(), MarketplaceError> {
        if !self.notifications.delete(id).await? {
            return Err(MarketplaceError::NotificationNotFound);
        }
        Ok(())
    }
}
