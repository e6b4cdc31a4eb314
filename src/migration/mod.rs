//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261018_000001_create_builds;
mod m20261018_000002_create_executions;
mod m20261018_000003_create_screenshots;
mod m20261018_000004_create_baselines;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261018_000001_create_builds::Migration),
            Box::new(m20261018_000002_create_executions::Migration),
            Box::new(m20261018_000003_create_screenshots::Migration),
            Box::new(m20261018_000004_create_baselines::Migration),
        ]
    }
}
