use thiserror::Error;

use crate::errors::StoreError;

/// Error type for authorization engine operations
///
/// Every precondition violation surfaces as a typed variant; the engine
/// performs no silent recovery. `Store` wraps backend failures and is the
/// only class a caller may reasonably retry; the rest are semantic.
#[derive(Error, Debug)]
pub enum AuthzError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthzError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        AuthzError::NotFound { entity: "user", id: id.into() }
    }

    pub fn role_not_found(id: impl Into<String>) -> Self {
        AuthzError::NotFound { entity: "role", id: id.into() }
    }

    pub fn permission_not_found(id: impl Into<String>) -> Self {
        AuthzError::NotFound { entity: "permission", id: id.into() }
    }

    pub fn duplicate_username(username: &str) -> Self {
        AuthzError::Conflict { message: format!("username already exists: {}", username) }
    }

    pub fn duplicate_email(email: &str) -> Self {
        AuthzError::Conflict { message: format!("email already exists: {}", email) }
    }

    pub fn duplicate_role_name(name: &str) -> Self {
        AuthzError::Conflict { message: format!("role name already exists: {}", name) }
    }

    pub fn duplicate_permission_name(name: &str) -> Self {
        AuthzError::Conflict { message: format!("permission name already exists: {}", name) }
    }

    pub fn duplicate_assignment(user_id: &str, role_id: &str) -> Self {
        AuthzError::Conflict {
            message: format!("user {} already has role {}", user_id, role_id),
        }
    }

    pub fn duplicate_grant(role_id: &str, permission_id: &str) -> Self {
        AuthzError::Conflict {
            message: format!("role {} already has permission {}", role_id, permission_id),
        }
    }

    pub fn system_role_protected(name: &str) -> Self {
        AuthzError::Forbidden {
            reason: format!("role {} is a system role and cannot be deleted or renamed", name),
        }
    }

    pub fn access_denied(user_id: &str, permission_name: &str) -> Self {
        AuthzError::Forbidden {
            reason: format!("user {} lacks permission {}", user_id, permission_name),
        }
    }

    pub fn store(operation: &str, source: sea_orm::DbErr) -> Self {
        AuthzError::Store(StoreError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    /// Whether this is a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AuthzError::Conflict { .. })
    }
}
