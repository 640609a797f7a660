use chrono::Utc;

use roomshare_domain::pagination::PageRequest;
use roomshare_marketplace::domain::types::{Notification, NotificationKind};
use roomshare_marketplace::error::MarketplaceError;
use roomshare_marketplace::usecase::notification::{
    CountUnreadUseCase, DeleteNotificationUseCase, ListNotificationsUseCase, MarkAllReadUseCase,
    MarkReadUseCase, SendNotificationInput, SendNotificationUseCase,
};

use crate::helpers::{MemoryStore, test_admin, test_user};

fn notice(recipient_id: uuid::Uuid, title: &str) -> Notification {
    Notification::new(
        recipient_id,
        None,
        NotificationKind::Admin,
        title,
        "body",
        None,
        Utc::now(),
    )
}

fn send_input(recipient_ids: Vec<uuid::Uuid>, broadcast: bool) -> SendNotificationInput {
    SendNotificationInput {
        recipient_ids,
        broadcast,
        title: "Maintenance".to_owned(),
        message: "Scheduled downtime tonight".to_owned(),
        link: None,
    }
}

#[tokio::test]
async fn should_mark_read_idempotently() {
    let store = MemoryStore::new();
    let user = store.insert_user(test_user("Lena"));
    let n = store.insert_notification(notice(user.id, "Hello"));
    let uc = MarkReadUseCase {
        notifications: store.clone(),
    };

    let first = uc.execute(user.id, n.id).await.unwrap();
    let second = uc.execute(user.id, n.id).await.unwrap();

    assert!(first.is_read());
    assert!(second.is_read());
    assert_eq!(first.read_at, second.read_at);
    let count = CountUnreadUseCase {
        notifications: store.clone(),
    };
    assert_eq!(count.execute(user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn should_forbid_marking_another_users_notification() {
    let store = MemoryStore::new();
    let user = store.insert_user(test_user("Lena"));
    let other = store.insert_user(test_user("Omar"));
    let n = store.insert_notification(notice(user.id, "Hello"));
    let uc = MarkReadUseCase {
        notifications: store.clone(),
    };

    let result = uc.execute(other.id, n.id).await;

    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
    assert!(!store.notifications_for(user.id)[0].is_read());
}

#[tokio::test]
async fn should_mark_all_read_and_filter_unread() {
    let store = MemoryStore::new();
    let user = store.insert_user(test_user("Lena"));
    store.insert_notification(notice(user.id, "One"));
    store.insert_notification(notice(user.id, "Two"));
    let list = ListNotificationsUseCase {
        notifications: store.clone(),
    };
    assert_eq!(
        list.execute(user.id, true, PageRequest::default())
            .await
            .unwrap()
            .len(),
        2
    );

    let changed = MarkAllReadUseCase {
        notifications: store.clone(),
    }
    .execute(user.id)
    .await
    .unwrap();

    assert_eq!(changed, 2);
    assert!(
        list.execute(user.id, true, PageRequest::default())
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        list.execute(user.id, false, PageRequest::default())
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn should_send_to_deduplicated_recipients() {
    let store = MemoryStore::new();
    let admin = store.insert_user(test_admin("Root"));
    let user = store.insert_user(test_user("Lena"));
    let uc = SendNotificationUseCase {
        notifications: store.clone(),
        users: store.clone(),
    };

    let sent = uc
        .execute(&admin, send_input(vec![user.id, user.id], false))
        .await
        .unwrap();

    assert_eq!(sent, 1);
    let notes = store.notifications_for(user.id);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Admin);
    assert_eq!(notes[0].sender_id, Some(admin.id));
}

#[tokio::test]
async fn should_broadcast_to_every_user() {
    let store = MemoryStore::new();
    let admin = store.insert_user(test_admin("Root"));
    store.insert_user(test_user("Lena"));
    store.insert_user(test_user("Omar"));
    let uc = SendNotificationUseCase {
        notifications: store.clone(),
        users: store.clone(),
    };

    let sent = uc.execute(&admin, send_input(vec![], true)).await.unwrap();

    assert_eq!(sent, 3);
}

#[tokio::test]
async fn should_require_recipients_unless_broadcast() {
    let store = MemoryStore::new();
    let admin = store.insert_user(test_admin("Root"));
    let uc = SendNotificationUseCase {
        notifications: store.clone(),
        users: store.clone(),
    };

    let result = uc.execute(&admin, send_input(vec![], false)).await;
    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));

    let result = uc
        .execute(&admin, send_input(vec![uuid::Uuid::now_v7()], false))
        .await;
    assert!(matches!(result, Err(MarketplaceError::UserNotFound)));
    assert!(store.world().notifications.is_empty());
}

#[tokio::test]
async fn should_delete_notification_once() {
    let store = MemoryStore::new();
    let user = store.insert_user(test_user("Lena"));
    let n = store.insert_notification(notice(user.id, "Hello"));
    let uc = DeleteNotificationUseCase {
        notifications: store.clone(),
    };

    uc.execute(n.id).await.unwrap();
    let result = uc.execute(n.id).await;

    assert!(matches!(result, Err(MarketplaceError::NotificationNotFound)));
}
