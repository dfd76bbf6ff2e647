pub use sea_orm_migration::prelude::*;

mod m20261017_000001_create_schema;
mod m20261017_000002_create_case_recordings;
mod m20261017_000003_create_site_configs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261017_000001_create_schema::Migration),
            Box::new(m20261017_000002_create_case_recordings::Migration),
            Box::new(m20261017_000003_create_site_configs::Migration),
        ]
    }
}
