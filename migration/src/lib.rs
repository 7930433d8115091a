pub use sea_orm_migration::prelude::*;

mod m20261018_000001_create_member_tables;
mod m20261018_000002_create_finance_tables;
mod m20261018_000003_create_voting_tables;
mod m20261018_000004_create_protocol_tables;
mod m20261018_000005_create_news_tables;
mod m20261018_000006_create_family_and_signature_tables;
mod m20261018_000007_create_personnel_report_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261018_000001_create_member_tables::Migration),
            Box::new(m20261018_000002_create_finance_tables::Migration),
            Box::new(m20261018_000003_create_voting_tables::Migration),
            Box::new(m20261018_000004_create_protocol_tables::Migration),
            Box::new(m20261018_000005_create_news_tables::Migration),
            Box::new(m20261018_000006_create_family_and_signature_tables::Migration),
            Box::new(m20261018_000007_create_personnel_report_tables::Migration),
        ]
    }
}
