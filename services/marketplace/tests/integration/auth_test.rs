use roomshare_auth_types::token::validate_session_token;
use roomshare_domain::pagination::PageRequest;
use roomshare_domain::user::UserRole;
use roomshare_marketplace::domain::types::ProfileChanges;
use roomshare_marketplace::error::MarketplaceError;
use roomshare_marketplace::usecase::auth::{LoginUseCase, RegisterInput, RegisterUseCase};
use roomshare_marketplace::usecase::user::{ListUsersUseCase, UpdateProfileUseCase};
use roomshare_testing::auth::TEST_SESSION_SECRET;

use crate::helpers::MemoryStore;

fn register_input(email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        name: "Clara".to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
        phone: Some(String::new()),
    }
}

fn register_uc(store: &MemoryStore) -> RegisterUseCase<MemoryStore> {
    RegisterUseCase {
        users: store.clone(),
        session_secret: TEST_SESSION_SECRET.to_owned(),
    }
}

fn login_uc(store: &MemoryStore) -> LoginUseCase<MemoryStore> {
    LoginUseCase {
        users: store.clone(),
        session_secret: TEST_SESSION_SECRET.to_owned(),
    }
}

#[tokio::test]
async fn should_register_and_issue_member_session() {
    let store = MemoryStore::new();

    let out = register_uc(&store)
        .execute(register_input(" Clara@Example.com ", "s3cret-pass"))
        .await
        .unwrap();

    assert_eq!(out.user.email, "clara@example.com");
    assert_eq!(out.user.phone, None);
    assert!(!out.user.is_admin);
    assert_ne!(out.user.password_hash, "s3cret-pass");
    let info = validate_session_token(&out.token, TEST_SESSION_SECRET).unwrap();
    assert_eq!(info.user_id, out.user.id);
    assert_eq!(info.role, UserRole::Member);
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let store = MemoryStore::new();
    let uc = register_uc(&store);
    uc.execute(register_input("clara@example.com", "s3cret-pass"))
        .await
        .unwrap();

    let result = uc
        .execute(register_input("CLARA@example.com", "another-pass"))
        .await;

    assert!(matches!(result, Err(MarketplaceError::EmailTaken)));
}

#[tokio::test]
async fn should_reject_short_password_and_bad_email() {
    let store = MemoryStore::new();
    let uc = register_uc(&store);

    let result = uc.execute(register_input("clara@example.com", "short")).await;
    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));

    let result = uc.execute(register_input("clara", "long-enough")).await;
    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
    assert!(store.world().users.is_empty());
}

#[tokio::test]
async fn should_login_with_correct_password_only() {
    let store = MemoryStore::new();
    register_uc(&store)
        .execute(register_input("clara@example.com", "s3cret-pass"))
        .await
        .unwrap();
    let uc = login_uc(&store);

    let out = uc.execute("Clara@example.com", "s3cret-pass").await.unwrap();
    assert_eq!(out.user.email, "clara@example.com");

    let result = uc.execute("clara@example.com", "wrong-pass").await;
    assert!(matches!(result, Err(MarketplaceError::InvalidCredentials)));

    let result = uc.execute("nobody@example.com", "s3cret-pass").await;
    assert!(matches!(result, Err(MarketplaceError::InvalidCredentials)));
}

#[tokio::test]
async fn should_update_profile_and_clear_blank_fields() {
    let store = MemoryStore::new();
    let user = register_uc(&store)
        .execute(register_input("clara@example.com", "s3cret-pass"))
        .await
        .unwrap()
        .user;
    let uc = UpdateProfileUseCase {
        users: store.clone(),
    };

    let updated = uc
        .execute(
            user.id,
            ProfileChanges {
                name: Some(" Clara B. ".to_owned()),
                bio: Some("Quiet, tidy, loves plants".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Clara B.");
    assert_eq!(updated.bio.as_deref(), Some("Quiet, tidy, loves plants"));

    let updated = uc
        .execute(
            user.id,
            ProfileChanges {
                bio: Some("  ".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio, None);

    let result = uc.execute(user.id, ProfileChanges::default()).await;
    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_search_users_by_name_or_email() {
    let store = MemoryStore::new();
    let uc = register_uc(&store);
    uc.execute(register_input("clara@example.com", "s3cret-pass"))
        .await
        .unwrap();
    uc.execute(RegisterInput {
        name: "Diego".to_owned(),
        ..register_input("diego@sample.org", "s3cret-pass")
    })
    .await
    .unwrap();
    let list = ListUsersUseCase {
        users: store.clone(),
    };

    let found = list
        .execute(Some("SAMPLE"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Diego");

    let all = list.execute(Some("  "), PageRequest::default()).await.unwrap();
    assert_eq!(all.len(), 2);
}
