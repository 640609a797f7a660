use uuid::Uuid;

use roomshare_domain::pagination::PageRequest;

use crate::domain::repository::UserRepository;
use crate::domain::types::{ProfileChanges, User};
use crate::error::MarketplaceError;

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> UpdateProfileUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        mut changes: ProfileChanges,
    ) -> Result<User, MarketplaceError> {
        if changes.is_empty() {
            return Err(MarketplaceError::invalid("nothing to update"));
        }
        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_owned();
            if name.is_empty() {
                return Err(MarketplaceError::invalid("name cannot be empty"));
            }
        }
        self.users
            .update_profile(user_id, &changes)
            .await?
            .ok_or(MarketplaceError::UserNotFound)
    }
}

// ── ListUsers (admin) ────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketplaceError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.users.list(search, page).await
    }
}

// ── DeleteUser (admin) ───────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> DeleteUserUseCase<R> {
    pub async fn execute(&self, actor: &User, target_id: Uuid) -> Result<(), MarketplaceError> {
        if !actor.is_admin {
            return Err(MarketplaceError::Forbidden);
        }
        if actor.id == target_id {
            return Err(MarketplaceError::invalid("cannot delete your own account"));
        }
        if !self.users.delete(target_id).await? {
            return Err(MarketplaceError::UserNotFound);
        }
        tracing::info!(admin_id = %actor.id, user_id = %target_id, "user deleted");
        Ok(())
    }
}
