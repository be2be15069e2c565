pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_users;
mod m20251001_000002_create_test_dates;
mod m20251001_000003_create_bookings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_users::Migration),
            Box::new(m20251001_000002_create_test_dates::Migration),
            Box::new(m20251001_000003_create_bookings::Migration),
        ]
    }
}
