use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::AuthzError;
use crate::types::db::user::{self, Entity as User};
use crate::types::dto::NewUser;

/// Raw user persistence. Policy (conflict checks, default role attachment,
/// audit) lives in UserService; methods here take the caller's connection so
/// they compose into one transaction.
pub struct UserStore {}

impl UserStore {
    pub fn new() -> Self {
        Self {}
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        new_user: NewUser,
    ) -> Result<user::Model, AuthzError> {
        let now = Utc::now().timestamp_millis();

        let row = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(new_user.username.clone()),
            email: Set(new_user.email.clone()),
            hashed_password: Set(new_user.hashed_password),
            avatar_url: Set(new_user.avatar_url),
            is_active: Set(true),
            is_superuser: Set(new_user.is_superuser),
            is_deleted: Set(false),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = row.insert(conn).await.map_err(|e| {
            // The schema's unique constraints backstop the service-level checks
            let message = e.to_string();
            if message.contains("users.username") {
                AuthzError::duplicate_username(&new_user.username)
            } else if message.contains("users.email") {
                AuthzError::duplicate_email(&new_user.email)
            } else {
                AuthzError::store("insert_user", e)
            }
        })?;

        Ok(model)
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<user::Model>, AuthzError> {
        User::find_by_id(user_id)
            .one(conn)
            .await
            .map_err(|e| AuthzError::store("find_user_by_id", e))
    }

    /// Lookup among non-deleted users only, for uniqueness checks.
    pub async fn find_live_by_username(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<Option<user::Model>, AuthzError> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::IsDeleted.eq(false))
            .one(conn)
            .await
            .map_err(|e| AuthzError::store("find_user_by_username", e))
    }

    pub async fn find_live_by_email(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<Option<user::Model>, AuthzError> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::IsDeleted.eq(false))
            .one(conn)
            .await
            .map_err(|e| AuthzError::store("find_user_by_email", e))
    }

    /// Non-deleted users ordered by creation.
    pub async fn list_live(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<user::Model>, AuthzError> {
        User::find()
            .filter(user::Column::IsDeleted.eq(false))
            .order_by_asc(user::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| AuthzError::store("list_users", e))
    }

    pub async fn set_active(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        is_active: bool,
    ) -> Result<(), AuthzError> {
        let user = self.require(conn, user_id).await?;

        let mut row: user::ActiveModel = user.into();
        row.is_active = Set(is_active);
        row.updated_at = Set(Utc::now().timestamp_millis());
        row.update(conn)
            .await
            .map_err(|e| AuthzError::store("set_user_active", e))?;

        Ok(())
    }

    pub async fn set_superuser(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        is_superuser: bool,
    ) -> Result<(), AuthzError> {
        let user = self.require(conn, user_id).await?;

        let mut row: user::ActiveModel = user.into();
        row.is_superuser = Set(is_superuser);
        row.updated_at = Set(Utc::now().timestamp_millis());
        row.update(conn)
            .await
            .map_err(|e| AuthzError::store("set_user_superuser", e))?;

        Ok(())
    }

    pub async fn soft_delete(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<(), AuthzError> {
        let user = self.require(conn, user_id).await?;

        let mut row: user::ActiveModel = user.into();
        row.is_deleted = Set(true);
        row.updated_at = Set(Utc::now().timestamp_millis());
        row.update(conn)
            .await
            .map_err(|e| AuthzError::store("soft_delete_user", e))?;

        Ok(())
    }

    pub async fn record_login(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<(), AuthzError> {
        let user = self.require(conn, user_id).await?;

        let now = Utc::now().timestamp_millis();
        let mut row: user::ActiveModel = user.into();
        row.last_login_at = Set(Some(now));
        row.updated_at = Set(now);
        row.update(conn)
            .await
            .map_err(|e| AuthzError::store("record_login", e))?;

        Ok(())
    }

    /// Apply profile field changes prepared by the service layer.
    pub async fn update_profile(
        &self,
        conn: &impl ConnectionTrait,
        user: user::Model,
        username: Option<String>,
        email: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<user::Model, AuthzError> {
        let mut row: user::ActiveModel = user.into();
        if let Some(username) = username {
            row.username = Set(username);
        }
        if let Some(email) = email {
            row.email = Set(email);
        }
        if let Some(avatar_url) = avatar_url {
            row.avatar_url = Set(Some(avatar_url));
        }
        row.updated_at = Set(Utc::now().timestamp_millis());

        row.update(conn)
            .await
            .map_err(|e| AuthzError::store("update_user_profile", e))
    }

    async fn require(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<user::Model, AuthzError> {
        self.find_by_id(conn, user_id)
            .await?
            .ok_or_else(|| AuthzError::user_not_found(user_id))
    }
}
