use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::types::Category;
use crate::error::MarketplaceError;
use crate::handlers::extract::AdminUser;
use crate::handlers::upload::{MultipartForm, read_multipart};
use crate::state::AppState;
use crate::usecase::category::{
    CategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase,
    ListCategoriesUseCase, UpdateCategoryUseCase,
};

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            icon_url: c.icon_url,
            created_at: c.created_at,
        }
    }
}

fn category_input(mut form: MultipartForm) -> CategoryInput {
    CategoryInput {
        name: form.text("name"),
        description: form.text("description"),
        icon: form.file("icon"),
    }
}

// ── GET /categories ──────────────────────────────────────────────────────────

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, MarketplaceError> {
    let usecase = ListCategoriesUseCase {
        categories: state.category_repo(),
    };
    let categories = usecase.execute().await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

// ── GET /categories/{id} ─────────────────────────────────────────────────────

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryResponse>, MarketplaceError> {
    let usecase = GetCategoryUseCase {
        categories: state.category_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── POST /admin/categories ───────────────────────────────────────────────────

pub async fn create_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CategoryResponse>), MarketplaceError> {
    let form = read_multipart(multipart).await?;
    let usecase = CreateCategoryUseCase {
        categories: state.category_repo(),
        files: state.file_store(),
    };
    let category = usecase.execute(category_input(form)).await?;
    tracing::info!(admin_id = %admin.id, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category.into())))
}

// ── PATCH /admin/categories/{id} ─────────────────────────────────────────────

pub async fn update_category(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<CategoryResponse>, MarketplaceError> {
    let form = read_multipart(multipart).await?;
    let usecase = UpdateCategoryUseCase {
        categories: state.category_repo(),
        files: state.file_store(),
    };
    let category = usecase.execute(id, category_input(form)).await?;
    Ok(Json(category.into()))
}

// ── DELETE /admin/categories/{id} ────────────────────────────────────────────

pub async fn delete_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = DeleteCategoryUseCase {
        categories: state.category_repo(),
    };
    usecase.execute(id).await?;
    tracing::info!(admin_id = %admin.id, category_id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
