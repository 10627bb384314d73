use std::fmt;

use serde_json::{Map, Value};

/// Audit event types emitted by the authorization engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    UserCreated,
    UserUpdated,
    UserSoftDeleted,
    RoleCreated,
    RoleUpdated,
    RoleSoftDeleted,
    RoleDeleted,
    PermissionCreated,
    PermissionUpdated,
    PermissionDeleted,
    RoleAssigned,
    RoleRevoked,
    PermissionGranted,
    PermissionRevoked,
    AccessDenied,
    Custom(String),
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::UserCreated => "user_created",
            EventType::UserUpdated => "user_updated",
            EventType::UserSoftDeleted => "user_soft_deleted",
            EventType::RoleCreated => "role_created",
            EventType::RoleUpdated => "role_updated",
            EventType::RoleSoftDeleted => "role_soft_deleted",
            EventType::RoleDeleted => "role_deleted",
            EventType::PermissionCreated => "permission_created",
            EventType::PermissionUpdated => "permission_updated",
            EventType::PermissionDeleted => "permission_deleted",
            EventType::RoleAssigned => "role_assigned",
            EventType::RoleRevoked => "role_revoked",
            EventType::PermissionGranted => "permission_granted",
            EventType::PermissionRevoked => "permission_revoked",
            EventType::AccessDenied => "access_denied",
            EventType::Custom(name) => name.as_str(),
        };
        write!(f, "{}", name)
    }
}

/// In-memory audit event, serialized by the audit store on write
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_type: EventType,
    pub actor_id: String,
    pub request_id: String,
    pub data: Map<String, Value>,
}

impl AuditEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            actor_id: "unknown".to_string(),
            request_id: "none".to_string(),
            data: Map::new(),
        }
    }
}
