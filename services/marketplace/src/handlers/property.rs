use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::types::{Property, PropertyChanges, PropertyFilter, PropertySortBy};
use crate::error::MarketplaceError;
use crate::handlers::extract::{CurrentUser, page_request, parse_query};
use crate::state::AppState;
use crate::usecase::property::{
    CreatePropertyInput, CreatePropertyUseCase, DeletePropertyUseCase, GetPropertyUseCase,
    ListOwnedPropertiesUseCase, SearchPropertiesUseCase, UpdatePropertyUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PropertyResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: Option<f64>,
    pub images: Vec<String>,
    pub is_available: bool,
    pub rating_avg: f64,
    pub rating_count: i32,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "roomshare_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Property> for PropertyResponse {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            category_id: p.category_id,
            title: p.title,
            description: p.description,
            address: p.address,
            city: p.city,
            latitude: p.latitude,
            longitude: p.longitude,
            price: p.price,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            area: p.area,
            images: p.images,
            is_available: p.is_available,
            rating_avg: p.rating_avg,
            rating_count: p.rating_count,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PropertySearchQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub category_id: Option<Uuid>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<i32>,
    pub available: Option<bool>,
    pub sort_by: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PageQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

// ── GET /properties ──────────────────────────────────────────────────────────

pub async fn search_properties(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<PropertyResponse>>, MarketplaceError> {
    let query: PropertySearchQuery = parse_query(raw_query.as_deref())?;
    let sort_by = match query.sort_by.as_deref() {
        Some(s) => PropertySortBy::from_kebab_case(s)
            .ok_or_else(|| MarketplaceError::invalid(format!("unknown sort-by: {s}")))?,
        None => PropertySortBy::default(),
    };
    let filter = PropertyFilter {
        q: query.q,
        city: query.city,
        category_id: query.category_id,
        min_price: query.min_price,
        max_price: query.max_price,
        min_bedrooms: query.min_bedrooms,
        is_available: query.available,
    };
    let usecase = SearchPropertiesUseCase {
        properties: state.property_repo(),
    };
    let properties = usecase
        .execute(filter, sort_by, page_request(query.per_page, query.page))
        .await?;
    Ok(Json(
        properties.into_iter().map(PropertyResponse::from).collect(),
    ))
}

// ── POST /properties ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePropertyRequest {
    pub category_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: f64,
    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub bathrooms: i32,
    pub area: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

pub async fn create_property(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<PropertyResponse>), MarketplaceError> {
    let usecase = CreatePropertyUseCase {
        properties: state.property_repo(),
        categories: state.category_repo(),
    };
    let property = usecase
        .execute(
            &user,
            CreatePropertyInput {
                category_id: body.category_id,
                title: body.title,
                description: body.description,
                address: body.address,
                city: body.city,
                latitude: body.latitude,
                longitude: body.longitude,
                price: body.price,
                bedrooms: body.bedrooms,
                bathrooms: body.bathrooms,
                area: body.area,
                images: body.images,
                is_available: body.is_available,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(property.into())))
}

// ── GET /properties/mine ─────────────────────────────────────────────────────

pub async fn list_my_properties(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<PropertyResponse>>, MarketplaceError> {
    let query: PageQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListOwnedPropertiesUseCase {
        properties: state.property_repo(),
    };
    let properties = usecase
        .execute(user.id, page_request(query.per_page, query.page))
        .await?;
    Ok(Json(
        properties.into_iter().map(PropertyResponse::from).collect(),
    ))
}

// ── GET /properties/{id} ─────────────────────────────────────────────────────

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyResponse>, MarketplaceError> {
    let usecase = GetPropertyUseCase {
        properties: state.property_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PATCH /properties/{id} ───────────────────────────────────────────────────

/// Distinguishes an absent field from an explicit `null`.
fn nullable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Deserialize)]
pub struct UpdatePropertyRequest {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub longitude: Option<Option<f64>>,
    pub price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub area: Option<Option<f64>>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

pub async fn update_property(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePropertyRequest>,
) -> Result<Json<PropertyResponse>, MarketplaceError> {
    let usecase = UpdatePropertyUseCase {
        properties: state.property_repo(),
        categories: state.category_repo(),
    };
    let property = usecase
        .execute(
            &user,
            id,
            PropertyChanges {
                category_id: body.category_id,
                title: body.title,
                description: body.description,
                address: body.address,
                city: body.city,
                latitude: body.latitude,
                longitude: body.longitude,
                price: body.price,
                bedrooms: body.bedrooms,
                bathrooms: body.bathrooms,
                area: body.area,
                images: body.images,
                is_available: body.is_available,
            },
        )
        .await?;
    Ok(Json(property.into()))
}

// ── DELETE /properties/{id} ──────────────────────────────────────────────────

pub async fn delete_property(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = DeletePropertyUseCase {
        properties: state.property_repo(),
    };
    usecase.execute(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
