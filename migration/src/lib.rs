pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_authz_tables;
mod m20250601_000002_create_audit_log;

pub struct RbacMigrator;

#[async_trait::async_trait]
impl MigratorTrait for RbacMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_authz_tables::Migration),
        ]
    }
}

pub struct AuditMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuditMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000002_create_audit_log::Migration),
        ]
    }
}
