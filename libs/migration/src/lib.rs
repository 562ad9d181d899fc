pub use sea_orm_migration::prelude::*;

mod m20250301_000000_bootstrap;
mod m20250301_000001_create_products;
mod m20250301_000002_create_product_images;
mod m20250302_000000_seed_products;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000000_bootstrap::Migration),
            Box::new(m20250301_000001_create_products::Migration),
            Box::new(m20250301_000002_create_product_images::Migration),
            Box::new(m20250302_000000_seed_products::Migration),
        ]
    }
}
