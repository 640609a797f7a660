use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    SqlErr, TransactionError, TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use roomshare_core::sea_ext::{OrderByRandom, Paginate};
use roomshare_domain::pagination::{PageRequest, Sort};
use roomshare_marketplace_schema::{
    bookings, categories, favorites, notifications, offers, properties, ratings, users,
};

use crate::domain::repository::{
    BookingRepository, CategoryRepository, FavoriteRepository, NotificationRepository,
    OfferRepository, PropertyRepository, RatingRepository, UserRepository,
};
use crate::domain::types::{
    Booking, BookingStatus, Category, Notification, NotificationKind, Offer, OfferStatus,
    ProfileChanges, Property, PropertyFilter, PropertySortBy, Rating, RatingSummary, User,
};
use crate::domain::workflow::{OfferStatusChange, RatingSubmission};
use crate::error::MarketplaceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

/// Failure inside a transaction body: a database error, or a domain
/// conflict found on re-reading rows under lock.
#[derive(Debug, thiserror::Error)]
enum TxnError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error(transparent)]
    Conflict(MarketplaceError),
}

fn txn_error(err: TransactionError<TxnError>, what: &'static str) -> MarketplaceError {
    match err {
        TransactionError::Transaction(TxnError::Conflict(e)) => e,
        TransactionError::Connection(e) | TransactionError::Transaction(TxnError::Db(e)) => {
            anyhow::Error::new(e).context(what).into()
        }
    }
}

/// Lock the property row. Offer submission takes it shared and acceptance
/// takes it exclusive, so no offer slips in while competing offers are rejected.
async fn lock_property<C: ConnectionTrait>(
    conn: &C,
    property_id: Uuid,
    exclusive: bool,
) -> Result<(), DbErr> {
    let query = properties::Entity::find_by_id(property_id)
        .select_only()
        .column(properties::Column::Id);
    let query = if exclusive {
        query.lock_exclusive()
    } else {
        query.lock_shared()
    };
    query.into_tuple::<Uuid>().one(conn).await?;
    Ok(())
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn notification_active_model(n: &Notification) -> notifications::ActiveModel {
    notifications::ActiveModel {
        id: Set(n.id),
        recipient_id: Set(n.recipient_id),
        sender_id: Set(n.sender_id),
        kind: Set(n.kind.as_str().to_owned()),
        title: Set(n.title.clone()),
        message: Set(n.message.clone()),
        link: Set(n.link.clone()),
        read_at: Set(n.read_at),
        created_at: Set(n.created_at),
    }
}

async fn insert_notifications<C: ConnectionTrait>(
    conn: &C,
    batch: &[Notification],
) -> Result<(), DbErr> {
    if batch.is_empty() {
        return Ok(());
    }
    notifications::Entity::insert_many(batch.iter().map(notification_active_model))
        .exec(conn)
        .await?;
    Ok(())
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: Arc<DatabaseConnection>,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), MarketplaceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            phone: Set(user.phone.clone()),
            avatar_url: Set(user.avatar_url.clone()),
            bio: Set(user.bio.clone()),
            is_admin: Set(user.is_admin),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(self.db.as_ref())
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(MarketplaceError::EmailTaken),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, MarketplaceError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find user for profile update")?
        else {
            return Ok(None);
        };
        let optional = |v: &String| Some(v.trim().to_owned()).filter(|v| !v.is_empty());

        let mut am = model.into_active_model();
        if let Some(name) = &changes.name {
            am.name = Set(name.clone());
        }
        if let Some(phone) = &changes.phone {
            am.phone = Set(optional(phone));
        }
        if let Some(avatar_url) = &changes.avatar_url {
            am.avatar_url = Set(optional(avatar_url));
        }
        if let Some(bio) = &changes.bio {
            am.bio = Set(optional(bio));
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(self.db.as_ref()).await.context("update user profile")?;
        Ok(Some(user_from_model(model)))
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketplaceError> {
        let mut query = users::Entity::find();
        if let Some(term) = search {
            let pattern = like_pattern(term);
            query = query.filter(
                Condition::any()
                    .add(Expr::col(users::Column::Name).ilike(&pattern))
                    .add(Expr::col(users::Column::Email).ilike(&pattern)),
            );
        }
        let models = query
            .order_by_desc(users::Column::CreatedAt)
            .with_page(page)
            .all(self.db.as_ref())
            .await
            .context("list users")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn list_ids(&self) -> Result<Vec<Uuid>, MarketplaceError> {
        let ids = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .into_tuple::<Uuid>()
            .all(self.db.as_ref())
            .await
            .context("list user ids")?;
        Ok(ids)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = users::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        phone: model.phone,
        avatar_url: model.avatar_url,
        bio: model.bio,
        is_admin: model.is_admin,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Property repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPropertyRepository {
    pub db: Arc<DatabaseConnection>,
}

fn property_active_model(p: &Property) -> properties::ActiveModel {
    properties::ActiveModel {
        id: Set(p.id),
        owner_id: Set(p.owner_id),
        category_id: Set(p.category_id),
        title: Set(p.title.clone()),
        description: Set(p.description.clone()),
        address: Set(p.address.clone()),
        city: Set(p.city.clone()),
        latitude: Set(p.latitude),
        longitude: Set(p.longitude),
        price: Set(p.price),
        bedrooms: Set(p.bedrooms),
        bathrooms: Set(p.bathrooms),
        area: Set(p.area),
        images: Set(serde_json::json!(p.images)),
        is_available: Set(p.is_available),
        rating_avg: Set(p.rating_avg),
        rating_count: Set(p.rating_count),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

fn filter_condition(filter: &PropertyFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(q) = filter.q.as_deref() {
        let pattern = like_pattern(q);
        cond = cond.add(
            Condition::any()
                .add(Expr::col((properties::Entity, properties::Column::Title)).ilike(&pattern))
                .add(
                    Expr::col((properties::Entity, properties::Column::Description))
                        .ilike(&pattern),
                )
                .add(Expr::col((properties::Entity, properties::Column::Address)).ilike(&pattern)),
        );
    }
    if let Some(city) = filter.city.as_deref() {
        let exact = city
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        cond = cond.add(Expr::col((properties::Entity, properties::Column::City)).ilike(exact));
    }
    if let Some(category_id) = filter.category_id {
        cond = cond.add(properties::Column::CategoryId.eq(category_id));
    }
    if let Some(min) = filter.min_price {
        cond = cond.add(properties::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        cond = cond.add(properties::Column::Price.lte(max));
    }
    if let Some(min) = filter.min_bedrooms {
        cond = cond.add(properties::Column::Bedrooms.gte(min));
    }
    if let Some(available) = filter.is_available {
        cond = cond.add(properties::Column::IsAvailable.eq(available));
    }
    cond
}

impl PropertyRepository for DbPropertyRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, MarketplaceError> {
        let model = properties::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find property by id")?;
        Ok(model.map(property_from_model).transpose()?)
    }

    async fn create(&self, property: &Property) -> Result<(), MarketplaceError> {
        property_active_model(property)
            .insert(self.db.as_ref())
            .await
            .context("create property")?;
        Ok(())
    }

    async fn update(&self, property: &Property) -> Result<(), MarketplaceError> {
        // rating writes own the aggregate columns
        let model = properties::ActiveModel {
            owner_id: NotSet,
            rating_avg: NotSet,
            rating_count: NotSet,
            created_at: NotSet,
            ..property_active_model(property)
        };
        model
            .update(self.db.as_ref())
            .await
            .context("update property")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        // offers, bookings, ratings and favorites go with it (ON DELETE CASCADE)
        let result = properties::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("delete property")?;
        Ok(result.rows_affected > 0)
    }

    async fn search(
        &self,
        filter: &PropertyFilter,
        sort_by: PropertySortBy,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError> {
        let query = properties::Entity::find().filter(filter_condition(filter));
        let query = match sort_by {
            PropertySortBy::CreatedAt(Sort::Desc) => {
                query.order_by_desc(properties::Column::CreatedAt)
            }
            PropertySortBy::CreatedAt(Sort::Asc) => {
                query.order_by_asc(properties::Column::CreatedAt)
            }
            PropertySortBy::Price(Sort::Desc) => query.order_by_desc(properties::Column::Price),
            PropertySortBy::Price(Sort::Asc) => query.order_by_asc(properties::Column::Price),
            PropertySortBy::RatingDesc => query
                .order_by_desc(properties::Column::RatingAvg)
                .order_by_desc(properties::Column::RatingCount),
            PropertySortBy::Random => query.order_by_random(),
        };
        let models = query
            .order_by_asc(properties::Column::Id)
            .with_page(page)
            .all(self.db.as_ref())
            .await
            .context("search properties")?;
        Ok(models
            .into_iter()
            .map(property_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError> {
        let models = properties::Entity::find()
            .filter(properties::Column::OwnerId.eq(owner_id))
            .order_by_desc(properties::Column::CreatedAt)
            .with_page(page)
            .all(self.db.as_ref())
            .await
            .context("list properties by owner")?;
        Ok(models
            .into_iter()
            .map(property_from_model)
            .collect::<anyhow::Result<_>>()?)
    }
}

fn property_from_model(model: properties::Model) -> anyhow::Result<Property> {
    let images = serde_json::from_value(model.images)
        .with_context(|| format!("malformed images column on property {}", model.id))?;
    Ok(Property {
        id: model.id,
        owner_id: model.owner_id,
        category_id: model.category_id,
        title: model.title,
        description: model.description,
        address: model.address,
        city: model.city,
        latitude: model.latitude,
        longitude: model.longitude,
        price: model.price,
        bedrooms: model.bedrooms,
        bathrooms: model.bathrooms,
        area: model.area,
        images,
        is_available: model.is_available,
        rating_avg: model.rating_avg,
        rating_count: model.rating_count,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: Arc<DatabaseConnection>,
}

fn category_active_model(c: &Category) -> categories::ActiveModel {
    categories::ActiveModel {
        id: Set(c.id),
        name: Set(c.name.clone()),
        description: Set(c.description.clone()),
        icon_url: Set(c.icon_url.clone()),
        created_at: Set(c.created_at),
    }
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, MarketplaceError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(self.db.as_ref())
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, MarketplaceError> {
        let model = categories::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find category by id")?;
        Ok(model.map(category_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, MarketplaceError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .context("find category by name")?;
        Ok(model.map(category_from_model))
    }

    async fn create(&self, category: &Category) -> Result<(), MarketplaceError> {
        match category_active_model(category).insert(self.db.as_ref()).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(MarketplaceError::CategoryNameTaken),
            Err(e) => Err(anyhow::Error::new(e).context("create category").into()),
        }
    }

    async fn update(&self, category: &Category) -> Result<(), MarketplaceError> {
        match category_active_model(category).update(self.db.as_ref()).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(MarketplaceError::CategoryNameTaken),
            Err(e) => Err(anyhow::Error::new(e).context("update category").into()),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let in_use = properties::Entity::find()
            .filter(properties::Column::CategoryId.eq(id))
            .count(self.db.as_ref())
            .await
            .context("count properties in category")?;
        if in_use > 0 {
            return Err(MarketplaceError::CategoryInUse);
        }
        match categories::Entity::delete_by_id(id).exec(self.db.as_ref()).await {
            Ok(result) => Ok(result.rows_affected > 0),
            // a property was attached between the count and the delete
            Err(e) if is_foreign_key_violation(&e) => Err(MarketplaceError::CategoryInUse),
            Err(e) => Err(anyhow::Error::new(e).context("delete category").into()),
        }
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        icon_url: model.icon_url,
        created_at: model.created_at,
    }
}

// ── Offer repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOfferRepository {
    pub db: Arc<DatabaseConnection>,
}

impl DbOfferRepository {
    async fn list_where(
        &self,
        cond: Condition,
        what: &'static str,
    ) -> Result<Vec<Offer>, MarketplaceError> {
        let models = offers::Entity::find()
            .filter(cond)
            .order_by_desc(offers::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .context(what)?;
        Ok(models
            .into_iter()
            .map(offer_from_model)
            .collect::<anyhow::Result<_>>()?)
    }
}

impl OfferRepository for DbOfferRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Offer>, MarketplaceError> {
        let model = offers::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find offer by id")?;
        Ok(model.map(offer_from_model).transpose()?)
    }

    async fn find_pending(
        &self,
        property_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Offer>, MarketplaceError> {
        let model = offers::Entity::find()
            .filter(offers::Column::PropertyId.eq(property_id))
            .filter(offers::Column::UserId.eq(user_id))
            .filter(offers::Column::Status.eq(OfferStatus::Pending.as_str()))
            .one(self.db.as_ref())
            .await
            .context("find pending offer")?;
        Ok(model.map(offer_from_model).transpose()?)
    }

    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<Offer>, MarketplaceError> {
        self.list_where(
            Condition::all().add(offers::Column::PropertyId.eq(property_id)),
            "list offers by property",
        )
        .await
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Offer>, MarketplaceError> {
        self.list_where(
            Condition::all().add(offers::Column::UserId.eq(user_id)),
            "list offers by user",
        )
        .await
    }

    async fn create(
        &self,
        offer: &Offer,
        notification: &Notification,
    ) -> Result<(), MarketplaceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let offer = offer.clone();
                let notification = notification.clone();
                Box::pin(async move {
                    lock_property(txn, offer.property_id, false).await?;
                    offers::ActiveModel {
                        id: Set(offer.id),
                        property_id: Set(offer.property_id),
                        user_id: Set(offer.user_id),
                        price: Set(offer.price),
                        message: Set(offer.message),
                        move_in_date: Set(offer.move_in_date),
                        status: Set(offer.status.as_str().to_owned()),
                        created_at: Set(offer.created_at),
                        updated_at: Set(offer.updated_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_notifications(txn, std::slice::from_ref(&notification)).await
                })
            })
            .await
            .context("create offer")?;
        Ok(())
    }

    async fn cancel(
        &self,
        offer_id: Uuid,
        notification: &Notification,
        now: DateTime<Utc>,
    ) -> Result<(), MarketplaceError> {
        self.db
            .transaction::<_, (), TxnError>(|txn| {
                let notification = notification.clone();
                Box::pin(async move {
                    let result = offers::Entity::update_many()
                        .col_expr(
                            offers::Column::Status,
                            Expr::value(OfferStatus::Cancelled.as_str()),
                        )
                        .col_expr(offers::Column::UpdatedAt, Expr::value(now))
                        .filter(offers::Column::Id.eq(offer_id))
                        .filter(offers::Column::Status.eq(OfferStatus::Pending.as_str()))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(TxnError::Conflict(MarketplaceError::OfferChanged));
                    }
                    insert_notifications(txn, std::slice::from_ref(&notification)).await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| txn_error(e, "cancel offer"))
    }

    async fn apply_status_change(
        &self,
        change: &OfferStatusChange,
    ) -> Result<u64, MarketplaceError> {
        self.db
            .transaction::<_, u64, TxnError>(|txn| {
                let change = change.clone();
                Box::pin(async move {
                    if change.reject_competing {
                        lock_property(txn, change.property_id, true).await?;
                    }

                    let result = offers::Entity::update_many()
                        .col_expr(offers::Column::Status, Expr::value(change.status.as_str()))
                        .col_expr(offers::Column::UpdatedAt, Expr::value(change.now))
                        .filter(offers::Column::Id.eq(change.offer_id))
                        .filter(offers::Column::Status.eq(change.expected_status.as_str()))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(TxnError::Conflict(MarketplaceError::OfferChanged));
                    }

                    let mut notifications = change.notifications.clone();
                    let mut rejected = 0;
                    if change.reject_competing {
                        let competing: Vec<(Uuid, Uuid)> = offers::Entity::find()
                            .select_only()
                            .column(offers::Column::Id)
                            .column(offers::Column::UserId)
                            .filter(offers::Column::PropertyId.eq(change.property_id))
                            .filter(offers::Column::Status.eq(OfferStatus::Pending.as_str()))
                            .filter(offers::Column::Id.ne(change.offer_id))
                            .lock_exclusive()
                            .into_tuple()
                            .all(txn)
                            .await?;
                        if !competing.is_empty() {
                            let ids: Vec<Uuid> = competing.iter().map(|(id, _)| *id).collect();
                            rejected = offers::Entity::update_many()
                                .col_expr(
                                    offers::Column::Status,
                                    Expr::value(OfferStatus::Rejected.as_str()),
                                )
                                .col_expr(offers::Column::UpdatedAt, Expr::value(change.now))
                                .filter(offers::Column::Id.is_in(ids))
                                .filter(offers::Column::Status.eq(OfferStatus::Pending.as_str()))
                                .exec(txn)
                                .await?
                                .rows_affected;
                            notifications.extend(
                                competing
                                    .iter()
                                    .map(|(_, requester)| change.competing_rejection(*requester)),
                            );
                        }
                    }

                    if let Some(booking) = &change.booking {
                        let active = bookings::Entity::find()
                            .filter(bookings::Column::OfferId.eq(booking.offer_id))
                            .filter(bookings::Column::Status.ne(BookingStatus::Cancelled.as_str()))
                            .count(txn)
                            .await?;
                        if active == 0 {
                            let inserted = bookings::ActiveModel {
                                id: Set(booking.id),
                                offer_id: Set(booking.offer_id),
                                property_id: Set(booking.property_id),
                                user_id: Set(booking.user_id),
                                status: Set(booking.status.as_str().to_owned()),
                                start_date: Set(booking.start_date),
                                created_at: Set(booking.created_at),
                                updated_at: Set(booking.updated_at),
                            }
                            .insert(txn)
                            .await;
                            match inserted {
                                Ok(_) => {}
                                // another acceptance booked the offer first
                                Err(e) if is_unique_violation(&e) => {
                                    return Err(TxnError::Conflict(MarketplaceError::OfferChanged));
                                }
                                Err(e) => return Err(e.into()),
                            }
                        }
                    }

                    insert_notifications(txn, &notifications).await?;
                    Ok(rejected)
                })
            })
            .await
            .map_err(|e| txn_error(e, "apply offer status change"))
    }
}

fn offer_from_model(model: offers::Model) -> anyhow::Result<Offer> {
    let status = OfferStatus::parse(&model.status)
        .ok_or_else(|| anyhow!("unknown offer status {:?}", model.status))?;
    Ok(Offer {
        id: model.id,
        property_id: model.property_id,
        user_id: model.user_id,
        price: model.price,
        message: model.message,
        move_in_date: model.move_in_date,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Booking repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBookingRepository {
    pub db: Arc<DatabaseConnection>,
}

impl BookingRepository for DbBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, MarketplaceError> {
        let model = bookings::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find booking by id")?;
        Ok(model.map(booking_from_model).transpose()?)
    }

    async fn has_active_for_offer(&self, offer_id: Uuid) -> Result<bool, MarketplaceError> {
        let count = bookings::Entity::find()
            .filter(bookings::Column::OfferId.eq(offer_id))
            .filter(bookings::Column::Status.ne(BookingStatus::Cancelled.as_str()))
            .count(self.db.as_ref())
            .await
            .context("count active bookings for offer")?;
        Ok(count > 0)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, MarketplaceError> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .order_by_desc(bookings::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .context("list bookings by user")?;
        Ok(models
            .into_iter()
            .map(booking_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, MarketplaceError> {
        let models = bookings::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                bookings::Relation::Property.def(),
            )
            .filter(properties::Column::OwnerId.eq(owner_id))
            .order_by_desc(bookings::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .context("list bookings by owner")?;
        Ok(models
            .into_iter()
            .map(booking_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        notification: &Notification,
        now: DateTime<Utc>,
    ) -> Result<(), MarketplaceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let notification = notification.clone();
                Box::pin(async move {
                    bookings::Entity::update_many()
                        .col_expr(bookings::Column::Status, Expr::value(status.as_str()))
                        .col_expr(bookings::Column::UpdatedAt, Expr::value(now))
                        .filter(bookings::Column::Id.eq(booking_id))
                        .exec(txn)
                        .await?;
                    insert_notifications(txn, std::slice::from_ref(&notification)).await
                })
            })
            .await
            .context("update booking status")?;
        Ok(())
    }
}

fn booking_from_model(model: bookings::Model) -> anyhow::Result<Booking> {
    let status = BookingStatus::parse(&model.status)
        .ok_or_else(|| anyhow!("unknown booking status {:?}", model.status))?;
    Ok(Booking {
        id: model.id,
        offer_id: model.offer_id,
        property_id: model.property_id,
        user_id: model.user_id,
        status,
        start_date: model.start_date,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Rating repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRatingRepository {
    pub db: Arc<DatabaseConnection>,
}

/// Re-read every rating of the property and store the new aggregate.
async fn recompute_summary<C: ConnectionTrait>(
    conn: &C,
    property_id: Uuid,
) -> Result<RatingSummary, DbErr> {
    let scores: Vec<i16> = ratings::Entity::find()
        .select_only()
        .column(ratings::Column::Score)
        .filter(ratings::Column::PropertyId.eq(property_id))
        .into_tuple()
        .all(conn)
        .await?;
    let scores: Vec<u8> = scores
        .into_iter()
        .map(|s| s.clamp(0, u8::MAX as i16) as u8)
        .collect();
    let summary = RatingSummary::from_scores(&scores);
    properties::Entity::update_many()
        .col_expr(properties::Column::RatingAvg, Expr::value(summary.average))
        .col_expr(properties::Column::RatingCount, Expr::value(summary.count))
        .filter(properties::Column::Id.eq(property_id))
        .exec(conn)
        .await?;
    Ok(summary)
}

fn rating_active_model(r: &Rating) -> ratings::ActiveModel {
    ratings::ActiveModel {
        id: Set(r.id),
        booking_id: Set(r.booking_id),
        property_id: Set(r.property_id),
        user_id: Set(r.user_id),
        score: Set(r.score as i16),
        comment: Set(r.comment.clone()),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    }
}

impl RatingRepository for DbRatingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, MarketplaceError> {
        let model = ratings::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find rating by id")?;
        Ok(model.map(rating_from_model))
    }

    async fn find_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<Rating>, MarketplaceError> {
        let model = ratings::Entity::find()
            .filter(ratings::Column::BookingId.eq(booking_id))
            .one(self.db.as_ref())
            .await
            .context("find rating by booking")?;
        Ok(model.map(rating_from_model))
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Rating>, MarketplaceError> {
        let models = ratings::Entity::find()
            .order_by_desc(ratings::Column::CreatedAt)
            .with_page(page)
            .all(self.db.as_ref())
            .await
            .context("list ratings")?;
        Ok(models.into_iter().map(rating_from_model).collect())
    }

    async fn submit(
        &self,
        submission: &RatingSubmission,
    ) -> Result<RatingSummary, MarketplaceError> {
        self.db
            .transaction::<_, RatingSummary, TxnError>(|txn| {
                let submission = submission.clone();
                Box::pin(async move {
                    let rating = &submission.rating;
                    if submission.created {
                        match rating_active_model(rating).insert(txn).await {
                            Ok(_) => {}
                            Err(e) if is_unique_violation(&e) => {
                                return Err(TxnError::Conflict(MarketplaceError::DuplicateRating));
                            }
                            Err(e) => return Err(e.into()),
                        }
                    } else {
                        rating_active_model(rating).update(txn).await?;
                    }
                    if let Some(booking_id) = submission.complete_booking {
                        bookings::Entity::update_many()
                            .col_expr(
                                bookings::Column::Status,
                                Expr::value(BookingStatus::Completed.as_str()),
                            )
                            .col_expr(bookings::Column::UpdatedAt, Expr::value(rating.updated_at))
                            .filter(bookings::Column::Id.eq(booking_id))
                            .exec(txn)
                            .await?;
                    }
                    if let Some(notification) = &submission.notification {
                        insert_notifications(txn, std::slice::from_ref(notification)).await?;
                    }
                    Ok(recompute_summary(txn, rating.property_id).await?)
                })
            })
            .await
            .map_err(|e| txn_error(e, "submit rating"))
    }

    async fn amend(&self, rating: &Rating) -> Result<RatingSummary, MarketplaceError> {
        let summary = self
            .db
            .transaction::<_, RatingSummary, DbErr>(|txn| {
                let rating = rating.clone();
                Box::pin(async move {
                    rating_active_model(&rating).update(txn).await?;
                    recompute_summary(txn, rating.property_id).await
                })
            })
            .await
            .context("amend rating")?;
        Ok(summary)
    }

    async fn remove(&self, rating: &Rating) -> Result<RatingSummary, MarketplaceError> {
        let summary = self
            .db
            .transaction::<_, RatingSummary, DbErr>(|txn| {
                let rating = rating.clone();
                Box::pin(async move {
                    ratings::Entity::delete_by_id(rating.id).exec(txn).await?;
                    recompute_summary(txn, rating.property_id).await
                })
            })
            .await
            .context("remove rating")?;
        Ok(summary)
    }
}

fn rating_from_model(model: ratings::Model) -> Rating {
    Rating {
        id: model.id,
        booking_id: model.booking_id,
        property_id: model.property_id,
        user_id: model.user_id,
        score: model.score.clamp(0, u8::MAX as i16) as u8,
        comment: model.comment,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Favorite repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: Arc<DatabaseConnection>,
}

impl FavoriteRepository for DbFavoriteRepository {
    async fn toggle(
        &self,
        user_id: Uuid,
        property_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, MarketplaceError> {
        let favorited = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let existing = favorites::Entity::find_by_id((user_id, property_id))
                        .one(txn)
                        .await?;
                    if existing.is_some() {
                        favorites::Entity::delete_by_id((user_id, property_id))
                            .exec(txn)
                            .await?;
                        return Ok(false);
                    }
                    favorites::ActiveModel {
                        user_id: Set(user_id),
                        property_id: Set(property_id),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await?;
                    Ok(true)
                })
            })
            .await
            .context("toggle favorite")?;
        Ok(favorited)
    }

    async fn list_properties(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Property>, MarketplaceError> {
        let models = properties::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                properties::Relation::Favorites.def(),
            )
            .filter(favorites::Column::UserId.eq(user_id))
            .order_by_desc(favorites::Column::CreatedAt)
            .with_page(page)
            .all(self.db.as_ref())
            .await
            .context("list favorite properties")?;
        Ok(models
            .into_iter()
            .map(property_from_model)
            .collect::<anyhow::Result<_>>()?)
    }
}

// ── Notification repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbNotificationRepository {
    pub db: Arc<DatabaseConnection>,
}

impl NotificationRepository for DbNotificationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, MarketplaceError> {
        let model = notifications::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find notification by id")?;
        Ok(model.map(notification_from_model).transpose()?)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Vec<Notification>, MarketplaceError> {
        let mut query =
            notifications::Entity::find().filter(notifications::Column::RecipientId.eq(user_id));
        if unread_only {
            query = query.filter(notifications::Column::ReadAt.is_null());
        }
        let models = query
            .order_by_desc(notifications::Column::CreatedAt)
            .with_page(page)
            .all(self.db.as_ref())
            .await
            .context("list notifications for user")?;
        Ok(models
            .into_iter()
            .map(notification_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        let count = notifications::Entity::find()
            .filter(notifications::Column::RecipientId.eq(user_id))
            .filter(notifications::Column::ReadAt.is_null())
            .count(self.db.as_ref())
            .await
            .context("count unread notifications")?;
        Ok(count)
    }

    async fn mark_read(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), MarketplaceError> {
        notifications::Entity::update_many()
            .col_expr(notifications::Column::ReadAt, Expr::value(now))
            .filter(notifications::Column::Id.eq(id))
            .filter(notifications::Column::ReadAt.is_null())
            .exec(self.db.as_ref())
            .await
            .context("mark notification read")?;
        Ok(())
    }

    async fn mark_all_read(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, MarketplaceError> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::ReadAt, Expr::value(now))
            .filter(notifications::Column::RecipientId.eq(user_id))
            .filter(notifications::Column::ReadAt.is_null())
            .exec(self.db.as_ref())
            .await
            .context("mark all notifications read")?;
        Ok(result.rows_affected)
    }

    async fn create_many(&self, batch: &[Notification]) -> Result<(), MarketplaceError> {
        insert_notifications(self.db.as_ref(), batch)
            .await
            .context("create notifications")?;
        Ok(())
    }

    async fn list_all(&self, page: PageRequest) -> Result<Vec<Notification>, MarketplaceError> {
        let models = notifications::Entity::find()
            .order_by_desc(notifications::Column::CreatedAt)
            .with_page(page)
            .all(self.db.as_ref())
            .await
            .context("list all notifications")?;
        Ok(models
            .into_iter()
            .map(notification_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = notifications::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("delete notification")?;
        Ok(result.rows_affected > 0)
    }
}

fn notification_from_model(model: notifications::Model) -> anyhow::Result<Notification> {
    let kind = NotificationKind::parse(&model.kind)
        .ok_or_else(|| anyhow!("unknown notification kind {:?}", model.kind))?;
    Ok(Notification {
        id: model.id,
        recipient_id: model.recipient_id,
        sender_id: model.sender_id,
        kind,
        title: model.title,
        message: model.message,
        link: model.link,
        read_at: model.read_at,
        created_at: model.created_at,
    })
}
