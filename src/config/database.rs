use migration::{AuditMigrator, MigratorTrait, RbacMigrator};
use sea_orm::{Database, DatabaseConnection};

use crate::config::BootstrapSettings;
use crate::errors::{AuthzError, StoreError};

/// The engine's two database connections: authorization data and audit trail.
pub struct DatabaseConnections {
    pub rbac: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect both databases.
    ///
    /// Does NOT run migrations - call migrate() separately.
    pub async fn init(settings: &BootstrapSettings) -> Result<Self, AuthzError> {
        let rbac = Self::connect(settings.database_url()).await?;
        let audit = Self::connect(settings.audit_database_url()).await?;

        Ok(Self { rbac, audit })
    }

    pub async fn migrate(&self) -> Result<(), AuthzError> {
        migrate_rbac_database(&self.rbac).await?;
        migrate_audit_database(&self.audit).await?;

        Ok(())
    }

    async fn connect(database_url: &str) -> Result<DatabaseConnection, AuthzError> {
        let db = Database::connect(database_url)
            .await
            .map_err(|e| AuthzError::store("connect_database", e))?;

        tracing::debug!("Connected to database: {}", database_url);

        Ok(db)
    }
}

/// Run migrations on the authorization database
pub async fn migrate_rbac_database(db: &DatabaseConnection) -> Result<(), AuthzError> {
    RbacMigrator::up(db, None)
        .await
        .map_err(|e| AuthzError::store("run_migrations", e))?;

    tracing::debug!("Authorization database migrations completed");

    Ok(())
}

/// Run migrations on the audit database
pub async fn migrate_audit_database(audit_db: &DatabaseConnection) -> Result<(), AuthzError> {
    AuditMigrator::up(audit_db, None)
        .await
        .map_err(|e| AuthzError::store("run_audit_migrations", e))?;

    tracing::debug!("Audit database migrations completed");

    Ok(())
}

/// Map a transaction-begin failure into the store error type
pub(crate) fn begin_failed(source: sea_orm::DbErr) -> AuthzError {
    AuthzError::Store(StoreError::TransactionBegin { source })
}

/// Map a transaction-commit failure into the store error type
pub(crate) fn commit_failed(source: sea_orm::DbErr) -> AuthzError {
    AuthzError::Store(StoreError::TransactionCommit { source })
}
