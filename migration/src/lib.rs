pub use sea_orm_migration::prelude::*;

mod m20251019_000001_create_hierarchy;
mod m20251019_000002_create_products;
mod m20251019_000003_create_treatments;
mod m20251019_000004_create_activity_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251019_000001_create_hierarchy::Migration),
            Box::new(m20251019_000002_create_products::Migration),
            Box::new(m20251019_000003_create_treatments::Migration),
            Box::new(m20251019_000004_create_activity_log::Migration),
        ]
    }
}
