use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::DatabaseConnections;
use crate::stores::{AssignmentStore, AuditStore, PermissionStore, RoleStore, UserStore};
use crate::types::internal::CacheStamp;

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once by the embedding application and shared
/// across services. Services extract the pieces they need in their `new`.
///
/// ```text
/// AppData::init(connections)
///   ↓ creates once
///   ├─ audit_store (Arc<AuditStore>, audit connection)
///   ├─ audit_logger (Arc<AuditLogger>)
///   ├─ user/role/permission/assignment stores
///   └─ stamp (Arc<CacheStamp>)
///   ↓ wrapped in Arc<AppData>
///   ├─ UserService::new(app_data)
///   ├─ RoleService::new(app_data)
///   ├─ AssignmentService::new(app_data)
///   └─ AuthorizationGuard::new(app_data)
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub audit_store: Arc<AuditStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub user_store: Arc<UserStore>,
    pub role_store: Arc<RoleStore>,
    pub permission_store: Arc<PermissionStore>,
    pub assignment_store: Arc<AssignmentStore>,
    pub stamp: Arc<CacheStamp>,
}

impl AppData {
    /// Initialize all application data
    ///
    /// Database connections should be connected and migrated before calling
    /// this. The audit store is created first since the logger depends on it.
    pub fn init(connections: DatabaseConnections) -> Self {
        tracing::debug!("Initializing AppData...");

        let audit_store = Arc::new(AuditStore::new(connections.audit.clone()));
        let audit_logger = Arc::new(AuditLogger::new(audit_store.clone()));

        let user_store = Arc::new(UserStore::new());
        let role_store = Arc::new(RoleStore::new());
        let permission_store = Arc::new(PermissionStore::new());
        let assignment_store = Arc::new(AssignmentStore::new());

        let stamp = Arc::new(CacheStamp::new());

        tracing::debug!("AppData initialization complete");

        Self {
            connections,
            audit_store,
            audit_logger,
            user_store,
            role_store,
            permission_store,
            assignment_store,
            stamp,
        }
    }
}
