use std::sync::Arc;

use serde_json::json;

use crate::errors::AuthzError;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::context::RequestContext;

/// Audit logging provider for authorization mutations and denials
///
/// Every administrative mutation (role/permission lifecycle, association
/// changes, user flag changes) and every denied access check is recorded,
/// keeping the audit trail complete even when the underlying association
/// rows are later soft-deleted away from view.
pub struct AuditLogger {
    audit_store: Arc<AuditStore>,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>) -> Self {
        Self { audit_store }
    }

    fn base_event(&self, ctx: &RequestContext, event_type: EventType) -> AuditEvent {
        let mut event = AuditEvent::new(event_type);
        event.actor_id = ctx.actor_id.clone();
        event.request_id = ctx.request_id.to_string();
        event
            .data
            .insert("source".to_string(), json!(format!("{:?}", ctx.source)));
        event
    }

    pub async fn log_user_created(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        username: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::UserCreated);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("username".to_string(), json!(username));

        self.audit_store.write_event(event).await
    }

    pub async fn log_user_updated(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        changed_fields: &[&str],
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::UserUpdated);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("changed_fields".to_string(), json!(changed_fields));

        self.audit_store.write_event(event).await
    }

    pub async fn log_user_soft_deleted(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::UserSoftDeleted);
        event.data.insert("target_user_id".to_string(), json!(user_id));

        self.audit_store.write_event(event).await
    }

    pub async fn log_role_created(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        name: &str,
        is_system: bool,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::RoleCreated);
        event.data.insert("role_id".to_string(), json!(role_id));
        event.data.insert("name".to_string(), json!(name));
        event.data.insert("is_system".to_string(), json!(is_system));

        self.audit_store.write_event(event).await
    }

    pub async fn log_role_updated(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        changed_fields: &[&str],
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::RoleUpdated);
        event.data.insert("role_id".to_string(), json!(role_id));
        event.data.insert("changed_fields".to_string(), json!(changed_fields));

        self.audit_store.write_event(event).await
    }

    pub async fn log_role_soft_deleted(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        name: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::RoleSoftDeleted);
        event.data.insert("role_id".to_string(), json!(role_id));
        event.data.insert("name".to_string(), json!(name));

        self.audit_store.write_event(event).await
    }

    pub async fn log_role_deleted(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        name: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::RoleDeleted);
        event.data.insert("role_id".to_string(), json!(role_id));
        event.data.insert("name".to_string(), json!(name));

        self.audit_store.write_event(event).await
    }

    pub async fn log_permission_created(
        &self,
        ctx: &RequestContext,
        permission_id: &str,
        name: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::PermissionCreated);
        event.data.insert("permission_id".to_string(), json!(permission_id));
        event.data.insert("name".to_string(), json!(name));

        self.audit_store.write_event(event).await
    }

    pub async fn log_permission_updated(
        &self,
        ctx: &RequestContext,
        permission_id: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::PermissionUpdated);
        event.data.insert("permission_id".to_string(), json!(permission_id));

        self.audit_store.write_event(event).await
    }

    pub async fn log_permission_deleted(
        &self,
        ctx: &RequestContext,
        permission_id: &str,
        name: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::PermissionDeleted);
        event.data.insert("permission_id".to_string(), json!(permission_id));
        event.data.insert("name".to_string(), json!(name));

        self.audit_store.write_event(event).await
    }

    pub async fn log_role_assigned(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::RoleAssigned);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("role_id".to_string(), json!(role_id));

        self.audit_store.write_event(event).await
    }

    pub async fn log_role_revoked(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::RoleRevoked);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("role_id".to_string(), json!(role_id));

        self.audit_store.write_event(event).await
    }

    pub async fn log_permission_granted(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::PermissionGranted);
        event.data.insert("role_id".to_string(), json!(role_id));
        event.data.insert("permission_id".to_string(), json!(permission_id));

        self.audit_store.write_event(event).await
    }

    pub async fn log_permission_revoked(
        &self,
        ctx: &RequestContext,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::PermissionRevoked);
        event.data.insert("role_id".to_string(), json!(role_id));
        event.data.insert("permission_id".to_string(), json!(permission_id));

        self.audit_store.write_event(event).await
    }

    pub async fn log_access_denied(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        permission_name: &str,
    ) -> Result<(), AuthzError> {
        let mut event = self.base_event(ctx, EventType::AccessDenied);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("permission_name".to_string(), json!(permission_name));

        self.audit_store.write_event(event).await
    }
}
