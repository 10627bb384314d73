use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::AuthzError;
use crate::types::db::permission::{self, Entity as Permission};
use crate::types::internal::permission_name;

pub struct PermissionStore {}

impl PermissionStore {
    pub fn new() -> Self {
        Self {}
    }

    /// Insert a permission with its canonical `module:action` name.
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        module: &str,
        action: &str,
        description: Option<String>,
    ) -> Result<permission::Model, AuthzError> {
        let name = permission_name(module, action);

        let row = permission::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            module: Set(module.to_string()),
            action: Set(action.to_string()),
            name: Set(name.clone()),
            description: Set(description),
            created_at: Set(Utc::now().timestamp_millis()),
        };

        row.insert(conn).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                AuthzError::duplicate_permission_name(&name)
            } else {
                AuthzError::store("insert_permission", e)
            }
        })
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        permission_id: &str,
    ) -> Result<Option<permission::Model>, AuthzError> {
        Permission::find_by_id(permission_id)
            .one(conn)
            .await
            .map_err(|e| AuthzError::store("find_permission_by_id", e))
    }

    pub async fn find_by_name(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
    ) -> Result<Option<permission::Model>, AuthzError> {
        Permission::find()
            .filter(permission::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| AuthzError::store("find_permission_by_name", e))
    }

    /// Whole catalog ordered by creation.
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<permission::Model>, AuthzError> {
        Permission::find()
            .order_by_asc(permission::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("list_permissions", e))
    }

    /// Permanent removal. FK cascade drops the permission's grant rows.
    pub async fn hard_delete(
        &self,
        conn: &impl ConnectionTrait,
        permission: permission::Model,
    ) -> Result<(), AuthzError> {
        permission
            .delete(conn)
            .await
            .map_err(|e| AuthzError::store("hard_delete_permission", e))?;

        Ok(())
    }

    /// Only the description is mutable; module/action/name are identity.
    pub async fn update_description(
        &self,
        conn: &impl ConnectionTrait,
        permission: permission::Model,
        description: Option<String>,
    ) -> Result<permission::Model, AuthzError> {
        let mut row: permission::ActiveModel = permission.into();
        row.description = Set(description);

        row.update(conn)
            .await
            .map_err(|e| AuthzError::store("update_permission_description", e))
    }
}
