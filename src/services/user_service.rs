use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::config::database::{begin_failed, commit_failed};
use crate::errors::AuthzError;
use crate::stores::{AssignmentStore, RoleStore, UserStore};
use crate::types::db::user;
use crate::types::dto::{NewUser, ProfileUpdate, UserSummary};
use crate::types::internal::context::RequestContext;
use crate::types::internal::CacheStamp;

/// Default role attached to newly created users when it exists.
const DEFAULT_ROLE_NAME: &str = "user";

/// User lifecycle operations.
///
/// Passwords arrive already hashed - credential handling belongs to the
/// authentication layer. Flag changes feed straight into resolution, so
/// every mutation bumps the guard's cache stamp.
pub struct UserService {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    role_store: Arc<RoleStore>,
    assignment_store: Arc<AssignmentStore>,
    audit_logger: Arc<AuditLogger>,
    stamp: Arc<CacheStamp>,
}

impl UserService {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.rbac.clone(),
            user_store: app_data.user_store.clone(),
            role_store: app_data.role_store.clone(),
            assignment_store: app_data.assignment_store.clone(),
            audit_logger: app_data.audit_logger.clone(),
            stamp: app_data.stamp.clone(),
        }
    }

    /// Create a user and attach the default `user` role when it is seeded.
    ///
    /// # Errors
    /// * `Conflict` - username or email already taken; the schema's unique
    ///   indexes span soft-deleted rows, so their names stay reserved
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        new_user: NewUser,
    ) -> Result<user::Model, AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        if self
            .user_store
            .find_live_by_username(&txn, &new_user.username)
            .await?
            .is_some()
        {
            return Err(AuthzError::duplicate_username(&new_user.username));
        }

        if self
            .user_store
            .find_live_by_email(&txn, &new_user.email)
            .await?
            .is_some()
        {
            return Err(AuthzError::duplicate_email(&new_user.email));
        }

        let user = self.user_store.insert(&txn, new_user).await?;

        if let Some(default_role) = self
            .role_store
            .find_live_by_name(&txn, DEFAULT_ROLE_NAME)
            .await?
        {
            self.assignment_store
                .insert_user_role(&txn, &user.id, &default_role.id)
                .await?;
        }

        txn.commit().await.map_err(commit_failed)?;

        self.stamp.bump();
        self.audit_logger
            .log_user_created(ctx, &user.id, &user.username)
            .await?;

        tracing::info!("User {} created by {}", user.username, ctx.actor_id);

        Ok(user)
    }

    /// Update profile fields, enforcing username/email uniqueness.
    ///
    /// # Errors
    /// * `NotFound` - user absent or soft-deleted
    /// * `Conflict` - new username or email already taken
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<user::Model, AuthzError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let user = self
            .user_store
            .find_by_id(&txn, user_id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;

        let new_username = update.username.filter(|u| *u != user.username);
        if let Some(username) = &new_username {
            if self
                .user_store
                .find_live_by_username(&txn, username)
                .await?
                .is_some()
            {
                return Err(AuthzError::duplicate_username(username));
            }
        }

        let new_email = update.email.filter(|e| *e != user.email);
        if let Some(email) = &new_email {
            if self
                .user_store
                .find_live_by_email(&txn, email)
                .await?
                .is_some()
            {
                return Err(AuthzError::duplicate_email(email));
            }
        }

        let mut changed: Vec<&str> = Vec::new();
        if new_username.is_some() {
            changed.push("username");
        }
        if new_email.is_some() {
            changed.push("email");
        }
        if update.avatar_url.is_some() {
            changed.push("avatar_url");
        }

        let updated = self
            .user_store
            .update_profile(&txn, user, new_username, new_email, update.avatar_url)
            .await?;

        txn.commit().await.map_err(commit_failed)?;

        self.audit_logger
            .log_user_updated(ctx, user_id, &changed)
            .await?;

        Ok(updated)
    }

    /// Enable or disable an account. Disabled accounts resolve to the empty
    /// permission set regardless of roles or the superuser flag.
    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        is_active: bool,
    ) -> Result<(), AuthzError> {
        self.user_store
            .set_active(&self.db, user_id, is_active)
            .await?;

        self.stamp.bump();
        self.audit_logger
            .log_user_updated(ctx, user_id, &["is_active"])
            .await?;

        tracing::info!(
            "User {} {} by {}",
            user_id,
            if is_active { "activated" } else { "deactivated" },
            ctx.actor_id
        );

        Ok(())
    }

    /// Toggle the superuser short-circuit for a user.
    pub async fn set_superuser(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        is_superuser: bool,
    ) -> Result<(), AuthzError> {
        self.user_store
            .set_superuser(&self.db, user_id, is_superuser)
            .await?;

        self.stamp.bump();
        self.audit_logger
            .log_user_updated(ctx, user_id, &["is_superuser"])
            .await?;

        tracing::info!(
            "Superuser flag for {} set to {} by {}",
            user_id,
            is_superuser,
            ctx.actor_id
        );

        Ok(())
    }

    /// Soft-delete a user. Role assignments stay behind for audit.
    pub async fn soft_delete_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<(), AuthzError> {
        self.user_store.soft_delete(&self.db, user_id).await?;

        self.stamp.bump();
        self.audit_logger.log_user_soft_deleted(ctx, user_id).await?;

        tracing::info!("User {} soft-deleted by {}", user_id, ctx.actor_id);

        Ok(())
    }

    /// Stamp the last-login timestamp, called by the authentication layer.
    pub async fn record_login(&self, user_id: &str) -> Result<(), AuthzError> {
        self.user_store.record_login(&self.db, user_id).await?;

        tracing::debug!("Login recorded for user {}", user_id);

        Ok(())
    }

    /// Fetch a user for administrative callers.
    ///
    /// # Errors
    /// * `NotFound` - user absent or soft-deleted
    pub async fn get_user(&self, user_id: &str) -> Result<UserSummary, AuthzError> {
        let user = self
            .user_store
            .find_by_id(&self.db, user_id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;

        Ok(user.into())
    }

    /// Non-deleted users ordered by creation.
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, AuthzError> {
        let users = self.user_store.list_live(&self.db).await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }
}
