use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{CategoryRepository, FileStore};
use crate::domain::types::Category;
use crate::error::MarketplaceError;
use crate::usecase::upload::{Upload, store_upload};

// ── ListCategories / GetCategory ─────────────────────────────────────────────

pub struct ListCategoriesUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> ListCategoriesUseCase<C> {
    pub async fn execute(&self) -> Result<Vec<Category>, MarketplaceError> {
        self.categories.list().await
    }
}

pub struct GetCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> GetCategoryUseCase<C> {
    pub async fn execute(&self, id: Uuid) -> Result<Category, MarketplaceError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::CategoryNotFound)
    }
}

// ── CreateCategory ───────────────────────────────────────────────────────────

pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<Upload>,
}

pub struct CreateCategoryUseCase<C: CategoryRepository, F: FileStore> {
    pub categories: C,
    pub files: F,
}

impl<C: CategoryRepository, F: FileStore> CreateCategoryUseCase<C, F> {
    pub async fn execute(&self, input: CategoryInput) -> Result<Category, MarketplaceError> {
        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| MarketplaceError::invalid("name is required"))?
            .to_owned();
        if self.categories.find_by_name(&name).await?.is_some() {
            return Err(MarketplaceError::CategoryNameTaken);
        }
        let icon_url = match input.icon {
            Some(icon) => Some(store_upload(&self.files, icon).await?),
            None => None,
        };
        let category = Category {
            id: Uuid::now_v7(),
            name,
            description: input.description.filter(|d| !d.trim().is_empty()),
            icon_url,
            created_at: Utc::now(),
        };
        self.categories.create(&category).await?;
        Ok(category)
    }
}

// ── UpdateCategory ───────────────────────────────────────────────────────────

pub struct UpdateCategoryUseCase<C: CategoryRepository, F: FileStore> {
    pub categories: C,
    pub files: F,
}

impl<C: CategoryRepository, F: FileStore> UpdateCategoryUseCase<C, F> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<Category, MarketplaceError> {
        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::CategoryNotFound)?;

        if let Some(name) = input.name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(MarketplaceError::invalid("name cannot be empty"));
            }
            if name != category.name {
                if let Some(other) = self.categories.find_by_name(name).await? {
                    if other.id != id {
                        return Err(MarketplaceError::CategoryNameTaken);
                    }
                }
                category.name = name.to_owned();
            }
        }
        if let Some(description) = input.description {
            category.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(icon) = input.icon {
            category.icon_url = Some(store_upload(&self.files, icon).await?);
        }

        self.categories.update(&category).await?;
        Ok(category)
    }
}

// ── DeleteCategory ───────────────────────────────────────────────────────────

pub struct DeleteCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> DeleteCategoryUseCase<C> {
    pub async fn execute(&self, id: Uuid) -> Result<(), MarketplaceError> {
        if !self.categories.delete(id).await? {
            return Err(MarketplaceError::CategoryNotFound);
        }
        Ok(())
    }
}
