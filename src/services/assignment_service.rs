use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::config::database::{begin_failed, commit_failed};
use crate::errors::AuthzError;
use crate::stores::{AssignmentStore, PermissionStore, RoleStore, UserStore};
use crate::types::db::{permission, role, user_role};
use crate::types::internal::context::RequestContext;
use crate::types::internal::CacheStamp;

/// Maintains the User↔Role and Role↔Permission association links.
///
/// Check-then-insert runs inside one transaction, with the schema's unique
/// indexes enforcing pair uniqueness under concurrent writers. Every
/// mutation bumps the guard's cache stamp and lands in the audit trail.
pub struct AssignmentService {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    role_store: Arc<RoleStore>,
    permission_store: Arc<PermissionStore>,
    assignment_store: Arc<AssignmentStore>,
    audit_logger: Arc<AuditLogger>,
    stamp: Arc<CacheStamp>,
}

impl AssignmentService {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.rbac.clone(),
            user_store: app_data.user_store.clone(),
            role_store: app_data.role_store.clone(),
            permission_store: app_data.permission_store.clone(),
            assignment_store: app_data.assignment_store.clone(),
            audit_logger: app_data.audit_logger.clone(),
            stamp: app_data.stamp.clone(),
        }
    }

    /// Assign a role to a user.
    ///
    /// # Errors
    /// * `NotFound` - user or role absent or soft-deleted
    /// * `Conflict` - the user already has the role
    pub async fn assign_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        role_id: &str,
    ) -> Result<user_role::Model, AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let user = self
            .user_store
            .find_by_id(&txn, user_id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;

        let role = self
            .role_store
            .find_by_id(&txn, role_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AuthzError::role_not_found(role_id))?;

        let row = self
            .assignment_store
            .insert_user_role(&txn, user_id, role_id)
            .await?;

        txn.commit().await.map_err(commit_failed)?;

        self.stamp.bump();
        self.audit_logger
            .log_role_assigned(ctx, user_id, role_id)
            .await?;

        tracing::info!(
            "Role {} assigned to user {} by {}",
            role.name,
            user.username,
            ctx.actor_id
        );

        Ok(row)
    }

    /// Idempotent variant of `assign_role`: an existing assignment is success.
    pub async fn ensure_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), AuthzError> {
        match self.assign_role(ctx, user_id, role_id).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_conflict() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove a role from a user. Absent assignments are a no-op, not an error.
    pub async fn revoke_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), AuthzError> {
        let removed = self
            .assignment_store
            .delete_user_role(&self.db, user_id, role_id)
            .await?;

        if removed {
            self.stamp.bump();
            self.audit_logger
                .log_role_revoked(ctx, user_id, role_id)
                .await?;

            tracing::info!(
                "Role {} revoked from user {} by {}",
                role_id,
                user_id,
                ctx.actor_id
            );
        }

        Ok(())
    }

    /// Grant a permission to a role.
    ///
    /// System roles' permission sets stay editable; only their deletion and
    /// rename are locked.
    ///
    /// # Errors
    /// * `NotFound` - role absent or soft-deleted, or permission absent
    /// * `Conflict` - the role already has the permission
    pub async fn grant_permission(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let role = self
            .role_store
            .find_by_id(&txn, role_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AuthzError::role_not_found(role_id))?;

        let permission = self
            .permission_store
            .find_by_id(&txn, permission_id)
            .await?
            .ok_or_else(|| AuthzError::permission_not_found(permission_id))?;

        self.assignment_store
            .insert_role_permission(&txn, role_id, permission_id)
            .await?;

        txn.commit().await.map_err(commit_failed)?;

        self.stamp.bump();
        self.audit_logger
            .log_permission_granted(ctx, role_id, permission_id)
            .await?;

        tracing::info!(
            "Permission {} granted to role {} by {}",
            permission.name,
            role.name,
            ctx.actor_id
        );

        Ok(())
    }

    /// Remove a permission from a role. Absent grants are a no-op.
    pub async fn revoke_permission(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), AuthzError> {
        let removed = self
            .assignment_store
            .delete_role_permission(&self.db, role_id, permission_id)
            .await?;

        if removed {
            self.stamp.bump();
            self.audit_logger
                .log_permission_revoked(ctx, role_id, permission_id)
                .await?;

            tracing::info!(
                "Permission {} revoked from role {} by {}",
                permission_id,
                role_id,
                ctx.actor_id
            );
        }

        Ok(())
    }

    /// Roles assigned to a user, ordered by assignment creation, soft-deleted
    /// roles excluded.
    ///
    /// # Errors
    /// * `NotFound` - user absent or soft-deleted
    pub async fn list_roles_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<role::Model>, AuthzError> {
        self.user_store
            .find_by_id(&self.db, user_id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;

        self.assignment_store
            .list_roles_for_user(&self.db, user_id)
            .await
    }

    /// Permissions granted to a role, ordered by grant creation.
    ///
    /// # Errors
    /// * `NotFound` - role absent or soft-deleted
    pub async fn list_permissions_for_role(
        &self,
        role_id: &str,
    ) -> Result<Vec<permission::Model>, AuthzError> {
        self.role_store
            .find_by_id(&self.db, role_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AuthzError::role_not_found(role_id))?;

        self.assignment_store
            .list_permissions_for_role(&self.db, role_id)
            .await
    }
}
