use chrono::Utc;
use uuid::Uuid;

use roomshare_domain::pagination::PageRequest;

use crate::domain::repository::{CategoryRepository, PropertyRepository};
use crate::domain::types::{Property, PropertyChanges, PropertyFilter, PropertySortBy, User};
use crate::error::MarketplaceError;

fn require_text(value: &str, field: &str) -> Result<(), MarketplaceError> {
    if value.trim().is_empty() {
        return Err(MarketplaceError::invalid(format!("{field} is required")));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), MarketplaceError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(MarketplaceError::invalid("price must be a positive number"));
    }
    Ok(())
}

fn validate_rooms(count: i32, field: &str) -> Result<(), MarketplaceError> {
    if count < 0 {
        return Err(MarketplaceError::invalid(format!(
            "{field} cannot be negative"
        )));
    }
    Ok(())
}

async fn ensure_category<C: CategoryRepository>(
    categories: &C,
    id: Uuid,
) -> Result<(), MarketplaceError> {
    categories
        .find_by_id(id)
        .await?
        .map(|_| ())
        .ok_or(MarketplaceError::CategoryNotFound)
}

// ── CreateProperty ───────────────────────────────────────────────────────────

pub struct CreatePropertyInput {
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
}

pub struct CreatePropertyUseCase<P: PropertyRepository, C: CategoryRepository> {
    pub properties: P,
    pub categories: C,
}

impl<P: PropertyRepository, C: CategoryRepository> CreatePropertyUseCase<P, C> {
    pub async fn execute(
        &self,
        owner: &User,
        input: CreatePropertyInput,
    ) -> Result<Property, MarketplaceError> {
        require_text(&input.title, "title")?;
        require_text(&input.address, "address")?;
        require_text(&input.city, "city")?;
        validate_price(input.price)?;
        validate_rooms(input.bedrooms, "bedrooms")?;
        validate_rooms(input.bathrooms, "bathrooms")?;
        ensure_category(&self.categories, input.category_id).await?;

        let now = Utc::now();
        let property = Property {
            id: Uuid::now_v7(),
            owner_id: owner.id,
            category_id: input.category_id,
            title: input.title.trim().to_owned(),
            description: input.description,
            address: input.address.trim().to_owned(),
            city: input.city.trim().to_owned(),
            latitude: input.latitude,
            longitude: input.longitude,
            price: input.price,
            bedrooms: input.bedrooms,
            bathrooms: input.bathrooms,
            area: input.area,
            images: input.images,
            is_available: input.is_available,
            rating_avg: 0.0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.properties.create(&property).await?;
        Ok(property)
    }
}

// ── GetProperty ──────────────────────────────────────────────────────────────

pub struct GetPropertyUseCase<P: PropertyRepository> {
    pub properties: P,
}

impl<P: PropertyRepository> GetPropertyUseCase<P> {
    pub async fn execute(&self, id: Uuid) -> Result<Property, MarketplaceError> {
        self.properties
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)
    }
}

// ── UpdateProperty ───────────────────────────────────────────────────────────

pub struct UpdatePropertyUseCase<P: PropertyRepository, C: CategoryRepository> {
    pub properties: P,
    pub categories: C,
}

impl<P: PropertyRepository, C: CategoryRepository> UpdatePropertyUseCase<P, C> {
    pub async fn execute(
        &self,
        actor: &User,
        id: Uuid,
        changes: PropertyChanges,
    ) -> Result<Property, MarketplaceError> {
        let mut property = self
            .properties
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)?;
        if !property.is_managed_by(actor) {
            return Err(MarketplaceError::Forbidden);
        }

        for (value, field) in [
            (&changes.title, "title"),
            (&changes.address, "address"),
            (&changes.city, "city"),
        ] {
            if let Some(v) = value {
                require_text(v, field)?;
            }
        }
        if let Some(price) = changes.price {
            validate_price(price)?;
        }
        if let Some(bedrooms) = changes.bedrooms {
            validate_rooms(bedrooms, "bedrooms")?;
        }
        if let Some(bathrooms) = changes.bathrooms {
            validate_rooms(bathrooms, "bathrooms")?;
        }
        if let Some(category_id) = changes.category_id {
            ensure_category(&self.categories, category_id).await?;
        }

        changes.apply(&mut property, Utc::now());
        self.properties.update(&property).await?;
        Ok(property)
    }
}

// ── DeleteProperty ───────────────────────────────────────────────────────────

pub struct DeletePropertyUseCase<P: PropertyRepository> {
    pub properties: P,
}

impl<P: PropertyRepository> DeletePropertyUseCase<P> {
    pub async fn execute(&self, actor: &User, id: Uuid) -> Result<(), MarketplaceError> {
        let property = self
            .properties
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)?;
        if !property.is_managed_by(actor) {
            return Err(MarketplaceError::Forbidden);
        }
        if !self.properties.delete(id).await? {
            return Err(MarketplaceError::PropertyNotFound);
        }
        tracing::info!(property_id = %id, actor_id = %actor.id, "property deleted");
        Ok(())
    }
}

// ── SearchProperties ─────────────────────────────────────────────────────────

pub struct SearchPropertiesUseCase<P: PropertyRepository> {
    pub properties: P,
}

impl<P: PropertyRepository> SearchPropertiesUseCase<P> {
    pub async fn execute(
        &self,
        mut filter: PropertyFilter,
        sort_by: PropertySortBy,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError> {
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
            if min > max {
                return Err(MarketplaceError::invalid(
                    "min-price cannot exceed max-price",
                ));
            }
        }
        filter.q = filter.q.map(|q| q.trim().to_owned()).filter(|q| !q.is_empty());
        filter.city = filter
            .city
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        self.properties.search(&filter, sort_by, page).await
    }
}

// ── ListMyProperties ─────────────────────────────────────────────────────────

pub struct ListOwnedPropertiesUseCase<P: PropertyRepository> {
    pub properties: P,
}

impl<P: PropertyRepository> ListOwnedPropertiesUseCase<P> {
    pub async fn execute(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError> {
        self.properties.list_by_owner(owner_id, page).await
    }
}
