use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::app_data::AppData;
use crate::config::database::{begin_failed, commit_failed};
use crate::errors::AuthzError;
use crate::stores::{AssignmentStore, UserStore};
use crate::types::internal::ResolvedPermissions;

/// Computes the effective permission set for a user.
pub struct PermissionResolver {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    assignment_store: Arc<AssignmentStore>,
}

impl PermissionResolver {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.rbac.clone(),
            user_store: app_data.user_store.clone(),
            assignment_store: app_data.assignment_store.clone(),
        }
    }

    /// Resolve the complete permission set for a user.
    ///
    /// All reads happen on one transaction, so the result reflects a single
    /// point-in-time snapshot of the store even under concurrent mutations.
    ///
    /// Precedence: a deleted or inactive account resolves to the empty set
    /// before the superuser flag is consulted; active superusers resolve to
    /// the wildcard without touching the catalog; everyone else gets the
    /// union of permission names across their non-deleted roles.
    ///
    /// # Errors
    /// * `NotFound` - no user with the given id
    /// * `Store` - backend failure
    pub async fn resolve(&self, user_id: &str) -> Result<ResolvedPermissions, AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let user = self
            .user_store
            .find_by_id(&txn, user_id)
            .await?
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;

        let resolved = if user.is_deleted || !user.is_active {
            ResolvedPermissions::empty()
        } else if user.is_superuser {
            ResolvedPermissions::Wildcard
        } else {
            let role_ids = self
                .assignment_store
                .live_role_ids_for_user(&txn, user_id)
                .await?;
            let names = self
                .assignment_store
                .permission_names_for_roles(&txn, &role_ids)
                .await?;
            names.into_iter().collect()
        };

        txn.commit().await.map_err(commit_failed)?;

        tracing::trace!(
            "Resolved permissions for user {}: {} explicit grants (wildcard: {})",
            user_id,
            resolved.len(),
            resolved.is_wildcard()
        );

        Ok(resolved)
    }
}
