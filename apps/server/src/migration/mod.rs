//! SeaORM database migrations.
//!
//! Written with the schema builder so the same migrations run on
//! PostgreSQL in production and SQLite in tests.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_documents;
mod m20260301_000003_create_jobs;
mod m20260301_000004_create_profiles;
mod m20260301_000005_create_password_reset_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_documents::Migration),
            Box::new(m20260301_000003_create_jobs::Migration),
            Box::new(m20260301_000004_create_profiles::Migration),
            Box::new(m20260301_000005_create_password_reset_tokens::Migration),
        ]
    }
}
