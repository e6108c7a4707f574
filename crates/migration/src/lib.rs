pub use sea_orm_migration::prelude::*;

mod m20260901_000000_accounts;
mod m20260901_000100_ledger;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000000_accounts::Migration),
            Box::new(m20260901_000100_ledger::Migration),
        ]
    }
}
