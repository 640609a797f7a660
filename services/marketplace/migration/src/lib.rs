use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_categories;
mod m20260301_000003_create_properties;
mod m20260301_000004_create_offers;
mod m20260301_000005_create_bookings;
mod m20260301_000006_create_ratings;
mod m20260301_000007_create_favorites;
mod m20260301_000008_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_categories::Migration),
            Box::new(m20260301_000003_create_properties::Migration),
            Box::new(m20260301_000004_create_offers::Migration),
            Box::new(m20260301_000005_create_bookings::Migration),
            Box::new(m20260301_000006_create_ratings::Migration),
            Box::new(m20260301_000007_create_favorites::Migration),
            Box::new(m20260301_000008_create_notifications::Migration),
        ]
    }
}
