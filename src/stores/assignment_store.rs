use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::errors::AuthzError;
use crate::types::db::permission::{self, Entity as Permission};
use crate::types::db::role::{self, Entity as Role};
use crate::types::db::role_permission::{self, Entity as RolePermission};
use crate::types::db::user_role::{self, Entity as UserRole};

/// Persistence for the two association tables (user_roles, role_permissions).
///
/// Association rows are owned independently of their parent entities: parent
/// soft-deletes leave them in place and resolution filters them out instead.
/// Uniqueness of the (user, role) and (role, permission) pairs is enforced
/// by the schema; inserts map the violation to a Conflict.
pub struct AssignmentStore {}

#[derive(FromQueryResult)]
struct IdRow {
    id: String,
}

#[derive(FromQueryResult)]
struct PermissionNameRow {
    name: String,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self {}
    }

    // ---- user_roles ----

    pub async fn insert_user_role(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        role_id: &str,
    ) -> Result<user_role::Model, AuthzError> {
        let row = user_role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            role_id: Set(role_id.to_string()),
            created_at: Set(Utc::now().timestamp_millis()),
        };

        row.insert(conn).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                AuthzError::duplicate_assignment(user_id, role_id)
            } else {
                AuthzError::store("insert_user_role", e)
            }
        })
    }

    /// Remove the association if present. Returns whether a row existed.
    pub async fn delete_user_role(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, AuthzError> {
        let result = UserRole::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.eq(role_id))
            .exec(conn)
            .await
            .map_err(|e| AuthzError::store("delete_user_role", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Roles assigned to a user, ordered by assignment creation, excluding
    /// soft-deleted roles.
    pub async fn list_roles_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<role::Model>, AuthzError> {
        let associations = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_asc(user_role::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("list_user_roles", e))?;

        if associations.is_empty() {
            return Ok(Vec::new());
        }

        let role_ids: Vec<String> = associations.iter().map(|a| a.role_id.clone()).collect();
        let roles = Role::find()
            .filter(role::Column::Id.is_in(role_ids))
            .filter(role::Column::IsDeleted.eq(false))
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("load_roles_for_user", e))?;

        // Preserve assignment order
        let mut by_id: HashMap<String, role::Model> =
            roles.into_iter().map(|r| (r.id.clone(), r)).collect();
        Ok(associations
            .iter()
            .filter_map(|a| by_id.remove(&a.role_id))
            .collect())
    }

    /// Ids of the user's non-deleted roles, for resolution.
    pub async fn live_role_ids_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<String>, AuthzError> {
        let role_ids: Vec<String> = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .select_only()
            .column(user_role::Column::RoleId)
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("load_role_ids_for_user", e))?;

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let live: Vec<IdRow> = Role::find()
            .filter(role::Column::Id.is_in(role_ids))
            .filter(role::Column::IsDeleted.eq(false))
            .select_only()
            .column(role::Column::Id)
            .into_model::<IdRow>()
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("filter_live_roles", e))?;

        Ok(live.into_iter().map(|r| r.id).collect())
    }

    // ---- role_permissions ----

    pub async fn insert_role_permission(
        &self,
        conn: &impl ConnectionTrait,
        role_id: &str,
        permission_id: &str,
    ) -> Result<role_permission::Model, AuthzError> {
        let row = role_permission::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            role_id: Set(role_id.to_string()),
            permission_id: Set(permission_id.to_string()),
            created_at: Set(Utc::now().timestamp_millis()),
        };

        row.insert(conn).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                AuthzError::duplicate_grant(role_id, permission_id)
            } else {
                AuthzError::store("insert_role_permission", e)
            }
        })
    }

    /// Remove the grant if present. Returns whether a row existed.
    pub async fn delete_role_permission(
        &self,
        conn: &impl ConnectionTrait,
        role_id: &str,
        permission_id: &str,
    ) -> Result<bool, AuthzError> {
        let result = RolePermission::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(role_permission::Column::PermissionId.eq(permission_id))
            .exec(conn)
            .await
            .map_err(|e| AuthzError::store("delete_role_permission", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Permissions granted to a role, ordered by grant creation.
    pub async fn list_permissions_for_role(
        &self,
        conn: &impl ConnectionTrait,
        role_id: &str,
    ) -> Result<Vec<permission::Model>, AuthzError> {
        let grants = RolePermission::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .order_by_asc(role_permission::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("list_role_permissions", e))?;

        if grants.is_empty() {
            return Ok(Vec::new());
        }

        let permission_ids: Vec<String> =
            grants.iter().map(|g| g.permission_id.clone()).collect();
        let permissions = Permission::find()
            .filter(permission::Column::Id.is_in(permission_ids))
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("load_permissions_for_role", e))?;

        let mut by_id: HashMap<String, permission::Model> =
            permissions.into_iter().map(|p| (p.id.clone(), p)).collect();
        Ok(grants
            .iter()
            .filter_map(|g| by_id.remove(&g.permission_id))
            .collect())
    }

    /// Distinct permission names granted to any of the given roles.
    pub async fn permission_names_for_roles(
        &self,
        conn: &impl ConnectionTrait,
        role_ids: &[String],
    ) -> Result<Vec<String>, AuthzError> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let permission_ids: Vec<String> = RolePermission::find()
            .filter(role_permission::Column::RoleId.is_in(role_ids.to_vec()))
            .select_only()
            .column(role_permission::Column::PermissionId)
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("load_permission_ids_for_roles", e))?;

        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<PermissionNameRow> = Permission::find()
            .filter(permission::Column::Id.is_in(permission_ids))
            .select_only()
            .column(permission::Column::Name)
            .into_model::<PermissionNameRow>()
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("load_permission_names", e))?;

        Ok(names.into_iter().map(|n| n.name).collect())
    }
}
