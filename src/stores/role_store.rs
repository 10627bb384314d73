use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::AuthzError;
use crate::types::db::role::{self, Entity as Role};

/// Raw role persistence. System-role protection is a service-layer policy;
/// this store only moves rows.
pub struct RoleStore {}

impl RoleStore {
    pub fn new() -> Self {
        Self {}
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
        display_name: &str,
        description: Option<String>,
        is_system: bool,
    ) -> Result<role::Model, AuthzError> {
        let now = Utc::now().timestamp_millis();

        let row = role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            display_name: Set(display_name.to_string()),
            description: Set(description),
            is_system: Set(is_system),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        row.insert(conn).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                AuthzError::duplicate_role_name(name)
            } else {
                AuthzError::store("insert_role", e)
            }
        })
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        role_id: &str,
    ) -> Result<Option<role::Model>, AuthzError> {
        Role::find_by_id(role_id)
            .one(conn)
            .await
            .map_err(|e| AuthzError::store("find_role_by_id", e))
    }

    /// Lookup by name across ALL rows, soft-deleted included. Name reuse is
    /// rejected even when the original role was soft-deleted, so uniqueness
    /// checks must not filter on is_deleted.
    pub async fn find_by_name(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
    ) -> Result<Option<role::Model>, AuthzError> {
        Role::find()
            .filter(role::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| AuthzError::store("find_role_by_name", e))
    }

    pub async fn find_live_by_name(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
    ) -> Result<Option<role::Model>, AuthzError> {
        Role::find()
            .filter(role::Column::Name.eq(name))
            .filter(role::Column::IsDeleted.eq(false))
            .one(conn)
            .await
            .map_err(|e| AuthzError::store("find_live_role_by_name", e))
    }

    /// Non-deleted roles ordered by creation.
    pub async fn list_live(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<role::Model>, AuthzError> {
        Role::find()
            .filter(role::Column::IsDeleted.eq(false))
            .order_by_asc(role::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("list_roles", e))
    }

    /// Apply field changes prepared by the service layer.
    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        role: role::Model,
        name: Option<String>,
        display_name: Option<String>,
        description: Option<String>,
    ) -> Result<role::Model, AuthzError> {
        let mut row: role::ActiveModel = role.into();
        if let Some(name) = name {
            row.name = Set(name);
        }
        if let Some(display_name) = display_name {
            row.display_name = Set(display_name);
        }
        if let Some(description) = description {
            row.description = Set(Some(description));
        }
        row.updated_at = Set(Utc::now().timestamp_millis());

        row.update(conn).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                AuthzError::Conflict {
                    message: "role name already exists".to_string(),
                }
            } else {
                AuthzError::store("update_role", e)
            }
        })
    }

    pub async fn soft_delete(
        &self,
        conn: &impl ConnectionTrait,
        role: role::Model,
    ) -> Result<(), AuthzError> {
        let mut row: role::ActiveModel = role.into();
        row.is_deleted = Set(true);
        row.updated_at = Set(Utc::now().timestamp_millis());
        row.update(conn)
            .await
            .map_err(|e| AuthzError::store("soft_delete_role", e))?;

        Ok(())
    }

    /// Permanent removal. FK cascade drops the role's association rows.
    pub async fn hard_delete(
        &self,
        conn: &impl ConnectionTrait,
        role: role::Model,
    ) -> Result<(), AuthzError> {
        role.delete(conn)
            .await
            .map_err(|e| AuthzError::store("hard_delete_role", e))?;

        Ok(())
    }
}
