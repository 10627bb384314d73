use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::config::database::{begin_failed, commit_failed};
use crate::errors::AuthzError;
use crate::stores::{AssignmentStore, PermissionStore, RoleStore};
use crate::types::db::{permission, role};
use crate::types::dto::{NewPermission, NewRole, RoleUpdate};
use crate::types::internal::context::RequestContext;
use crate::types::internal::{permission_name, CacheStamp};

/// Default permission catalog seeded at bootstrap.
const DEFAULT_PERMISSIONS: &[(&str, &str, &str)] = &[
    ("users", "view", "List and inspect user accounts"),
    ("users", "create", "Create user accounts"),
    ("users", "edit", "Edit user accounts and role assignments"),
    ("users", "delete", "Deactivate or delete user accounts"),
    ("config", "view", "View system configuration"),
    ("config", "edit", "Edit system configuration"),
    ("resources", "view", "View managed resources"),
    ("resources", "create", "Create managed resources"),
    ("resources", "edit", "Edit managed resources"),
    ("resources", "delete", "Delete managed resources"),
    ("rules", "view", "View processing rules"),
    ("rules", "create", "Create processing rules"),
    ("rules", "edit", "Edit processing rules"),
    ("rules", "delete", "Delete processing rules"),
    ("chat", "use", "Use the chat interface"),
    ("agents", "use", "Run agents"),
];

/// Default roles seeded at bootstrap. The grant list names permissions from
/// the catalog above; an empty list means the full catalog.
const DEFAULT_ROLES: &[(&str, &str, &str, &[&str])] = &[
    ("admin", "Administrator", "Full access to every module", &[]),
    (
        "manager",
        "Manager",
        "User and configuration management",
        &[
            "users:view",
            "users:create",
            "users:edit",
            "users:delete",
            "config:view",
            "config:edit",
        ],
    ),
    (
        "developer",
        "Developer",
        "Resource and rule management",
        &[
            "resources:view",
            "resources:create",
            "resources:edit",
            "resources:delete",
            "rules:view",
            "rules:create",
            "rules:edit",
            "rules:delete",
        ],
    ),
    (
        "user",
        "User",
        "Baseline chat and agent usage",
        &["chat:use", "agents:use"],
    ),
];

/// Role and permission lifecycle management.
///
/// Creates, updates and deletes roles and permissions while protecting
/// system roles from deletion and rename, and seeds the default roles at
/// first initialization.
pub struct RoleService {
    db: DatabaseConnection,
    role_store: Arc<RoleStore>,
    permission_store: Arc<PermissionStore>,
    assignment_store: Arc<AssignmentStore>,
    audit_logger: Arc<AuditLogger>,
    stamp: Arc<CacheStamp>,
}

impl RoleService {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.rbac.clone(),
            role_store: app_data.role_store.clone(),
            permission_store: app_data.permission_store.clone(),
            assignment_store: app_data.assignment_store.clone(),
            audit_logger: app_data.audit_logger.clone(),
            stamp: app_data.stamp.clone(),
        }
    }

    /// Create a non-system role.
    ///
    /// # Errors
    /// * `Conflict` - the name exists, soft-deleted roles included; names
    ///   are never reusable
    pub async fn create_role(
        &self,
        ctx: &RequestContext,
        new_role: NewRole,
    ) -> Result<role::Model, AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        if self
            .role_store
            .find_by_name(&txn, &new_role.name)
            .await?
            .is_some()
        {
            return Err(AuthzError::duplicate_role_name(&new_role.name));
        }

        let role = self
            .role_store
            .insert(
                &txn,
                &new_role.name,
                &new_role.display_name,
                new_role.description,
                false,
            )
            .await?;

        txn.commit().await.map_err(commit_failed)?;

        self.audit_logger
            .log_role_created(ctx, &role.id, &role.name, false)
            .await?;

        tracing::info!("Role {} created by {}", role.name, ctx.actor_id);

        Ok(role)
    }

    /// Update a role's name, display name or description.
    ///
    /// # Errors
    /// * `NotFound` - role absent or soft-deleted
    /// * `Forbidden` - rename attempted on a system role
    /// * `Conflict` - new name already taken
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        update: RoleUpdate,
    ) -> Result<role::Model, AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let role = self
            .role_store
            .find_by_id(&txn, role_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AuthzError::role_not_found(role_id))?;

        let rename = update.name.as_deref().filter(|n| *n != role.name);
        if let Some(new_name) = rename {
            if role.is_system {
                return Err(AuthzError::system_role_protected(&role.name));
            }
            if self.role_store.find_by_name(&txn, new_name).await?.is_some() {
                return Err(AuthzError::duplicate_role_name(new_name));
            }
        }

        let mut changed: Vec<&str> = Vec::new();
        if rename.is_some() {
            changed.push("name");
        }
        if update.display_name.is_some() {
            changed.push("display_name");
        }
        if update.description.is_some() {
            changed.push("description");
        }

        let updated = self
            .role_store
            .update(
                &txn,
                role,
                rename.map(str::to_string),
                update.display_name,
                update.description,
            )
            .await?;

        txn.commit().await.map_err(commit_failed)?;

        self.audit_logger
            .log_role_updated(ctx, &updated.id, &changed)
            .await?;

        Ok(updated)
    }

    /// Soft-delete a role. Its association rows stay in place for audit;
    /// resolution ignores them because it filters on `is_deleted`.
    ///
    /// # Errors
    /// * `NotFound` - role absent or already soft-deleted
    /// * `Forbidden` - the role is a system role
    pub async fn soft_delete_role(
        &self,
        ctx: &RequestContext,
        role_id: &str,
    ) -> Result<(), AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let role = self
            .role_store
            .find_by_id(&txn, role_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AuthzError::role_not_found(role_id))?;

        if role.is_system {
            return Err(AuthzError::system_role_protected(&role.name));
        }

        let name = role.name.clone();
        self.role_store.soft_delete(&txn, role).await?;

        txn.commit().await.map_err(commit_failed)?;

        self.stamp.bump();
        self.audit_logger
            .log_role_soft_deleted(ctx, role_id, &name)
            .await?;

        tracing::info!("Role {} soft-deleted by {}", name, ctx.actor_id);

        Ok(())
    }

    /// Permanently delete a role. FK cascade removes its association rows.
    ///
    /// # Errors
    /// * `NotFound` - role absent
    /// * `Forbidden` - the role is a system role
    pub async fn hard_delete_role(
        &self,
        ctx: &RequestContext,
        role_id: &str,
    ) -> Result<(), AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let role = self
            .role_store
            .find_by_id(&txn, role_id)
            .await?
            .ok_or_else(|| AuthzError::role_not_found(role_id))?;

        if role.is_system {
            return Err(AuthzError::system_role_protected(&role.name));
        }

        let name = role.name.clone();
        self.role_store.hard_delete(&txn, role).await?;

        txn.commit().await.map_err(commit_failed)?;

        self.stamp.bump();
        self.audit_logger
            .log_role_deleted(ctx, role_id, &name)
            .await?;

        tracing::info!("Role {} deleted by {}", name, ctx.actor_id);

        Ok(())
    }

    /// Create a permission. Its name is computed as `module:action` and is
    /// immutable afterwards.
    ///
    /// # Errors
    /// * `Conflict` - a permission with that name exists
    pub async fn create_permission(
        &self,
        ctx: &RequestContext,
        new_permission: NewPermission,
    ) -> Result<permission::Model, AuthzError> {
        let name = permission_name(&new_permission.module, &new_permission.action);

        let txn = self.db.begin().await.map_err(begin_failed)?;

        if self
            .permission_store
            .find_by_name(&txn, &name)
            .await?
            .is_some()
        {
            return Err(AuthzError::duplicate_permission_name(&name));
        }

        let permission = self
            .permission_store
            .insert(
                &txn,
                &new_permission.module,
                &new_permission.action,
                new_permission.description,
            )
            .await?;

        txn.commit().await.map_err(commit_failed)?;

        self.audit_logger
            .log_permission_created(ctx, &permission.id, &permission.name)
            .await?;

        tracing::info!("Permission {} created by {}", permission.name, ctx.actor_id);

        Ok(permission)
    }

    /// Permanently delete a permission. FK cascade removes its grant rows,
    /// so it disappears from every role on the next resolution.
    ///
    /// # Errors
    /// * `NotFound` - permission absent
    pub async fn delete_permission(
        &self,
        ctx: &RequestContext,
        permission_id: &str,
    ) -> Result<(), AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let permission = self
            .permission_store
            .find_by_id(&txn, permission_id)
            .await?
            .ok_or_else(|| AuthzError::permission_not_found(permission_id))?;

        let name = permission.name.clone();
        self.permission_store.hard_delete(&txn, permission).await?;

        txn.commit().await.map_err(commit_failed)?;

        self.stamp.bump();
        self.audit_logger
            .log_permission_deleted(ctx, permission_id, &name)
            .await?;

        tracing::info!("Permission {} deleted by {}", name, ctx.actor_id);

        Ok(())
    }

    /// Edit a permission's description, the only mutable field.
    ///
    /// # Errors
    /// * `NotFound` - permission absent
    pub async fn update_permission_description(
        &self,
        ctx: &RequestContext,
        permission_id: &str,
        description: Option<String>,
    ) -> Result<permission::Model, AuthzError> {
        let permission = self
            .permission_store
            .find_by_id(&self.db, permission_id)
            .await?
            .ok_or_else(|| AuthzError::permission_not_found(permission_id))?;

        let updated = self
            .permission_store
            .update_description(&self.db, permission, description)
            .await?;

        self.audit_logger
            .log_permission_updated(ctx, &updated.id)
            .await?;

        Ok(updated)
    }

    /// Non-deleted roles ordered by creation.
    pub async fn list_roles(&self) -> Result<Vec<role::Model>, AuthzError> {
        self.role_store.list_live(&self.db).await
    }

    /// The whole permission catalog ordered by creation.
    pub async fn list_permissions(&self) -> Result<Vec<permission::Model>, AuthzError> {
        self.permission_store.list(&self.db).await
    }

    /// Seed the default permission catalog and the four system roles.
    ///
    /// Idempotent: existing permissions, roles and grants are left alone, so
    /// this can run on every startup. The `admin` role receives the full
    /// catalog as seeded; true wildcard access stays the superuser flag.
    pub async fn seed_defaults(&self, ctx: &RequestContext) -> Result<(), AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let mut created_permissions: Vec<(String, String)> = Vec::new();
        for (module, action, description) in DEFAULT_PERMISSIONS {
            let name = permission_name(module, action);
            if self
                .permission_store
                .find_by_name(&txn, &name)
                .await?
                .is_none()
            {
                let permission = self
                    .permission_store
                    .insert(&txn, module, action, Some(description.to_string()))
                    .await?;
                created_permissions.push((permission.id, permission.name));
            }
        }

        let mut created_roles: Vec<(String, String)> = Vec::new();
        for (name, display_name, description, grants) in DEFAULT_ROLES {
            let role = match self.role_store.find_by_name(&txn, name).await? {
                Some(existing) => existing,
                None => {
                    let role = self
                        .role_store
                        .insert(&txn, name, display_name, Some(description.to_string()), true)
                        .await?;
                    created_roles.push((role.id.clone(), role.name.clone()));
                    role
                }
            };

            let grant_names: Vec<String> = if grants.is_empty() {
                DEFAULT_PERMISSIONS
                    .iter()
                    .map(|(module, action, _)| permission_name(module, action))
                    .collect()
            } else {
                grants.iter().map(|g| g.to_string()).collect()
            };

            for grant_name in grant_names {
                let permission = self
                    .permission_store
                    .find_by_name(&txn, &grant_name)
                    .await?
                    .ok_or_else(|| AuthzError::permission_not_found(grant_name.as_str()))?;

                match self
                    .assignment_store
                    .insert_role_permission(&txn, &role.id, &permission.id)
                    .await
                {
                    Ok(_) => {}
                    Err(e) if e.is_conflict() => {}
                    Err(e) => return Err(e),
                }
            }
        }

        txn.commit().await.map_err(commit_failed)?;

        self.stamp.bump();

        for (id, name) in &created_permissions {
            self.audit_logger.log_permission_created(ctx, id, name).await?;
        }
        for (id, name) in &created_roles {
            self.audit_logger.log_role_created(ctx, id, name, true).await?;
        }

        tracing::info!(
            "Default roles seeded: {} permissions and {} roles created",
            created_permissions.len(),
            created_roles.len()
        );

        Ok(())
    }
}
