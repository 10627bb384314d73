use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::errors::AuthzError;
use crate::services::PermissionResolver;
use crate::types::internal::context::RequestContext;
use crate::types::internal::{CacheStamp, ResolvedPermissions};

struct CachedResolution {
    stamp: u64,
    resolved: ResolvedPermissions,
}

/// Public check-access entry point.
///
/// Wraps the resolver with a derived, disposable cache: entries are stamped
/// with the shared mutation counter and only served while the counter is
/// unchanged. Every mutating service bumps the counter, so a cached
/// resolution can never outlive a change to roles, grants, or user flags.
pub struct AuthorizationGuard {
    resolver: PermissionResolver,
    audit_logger: Arc<AuditLogger>,
    stamp: Arc<CacheStamp>,
    cache: RwLock<HashMap<String, CachedResolution>>,
}

impl AuthorizationGuard {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            resolver: PermissionResolver::new(app_data.clone()),
            audit_logger: app_data.audit_logger.clone(),
            stamp: app_data.stamp.clone(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve through the cache.
    ///
    /// # Errors
    /// * `NotFound` - no user with the given id
    /// * `Store` - backend failure
    pub async fn resolve(&self, user_id: &str) -> Result<ResolvedPermissions, AuthzError> {
        let stamp = self.stamp.current();

        if let Ok(cache) = self.cache.read() {
            if let Some(entry) = cache.get(user_id) {
                if entry.stamp == stamp {
                    return Ok(entry.resolved.clone());
                }
            }
        }

        let resolved = self.resolver.resolve(user_id).await?;

        // Only cache if no mutation landed while we were resolving
        if self.stamp.current() == stamp {
            if let Ok(mut cache) = self.cache.write() {
                cache.insert(
                    user_id.to_string(),
                    CachedResolution {
                        stamp,
                        resolved: resolved.clone(),
                    },
                );
            }
        }

        Ok(resolved)
    }

    /// Whether the user holds the given `module:action` permission.
    pub async fn can_access(
        &self,
        user_id: &str,
        permission_name: &str,
    ) -> Result<bool, AuthzError> {
        let resolved = self.resolve(user_id).await?;
        Ok(resolved.contains(permission_name))
    }

    /// Fail with `Forbidden` unless the user holds the permission.
    ///
    /// Denials are written to the audit trail.
    pub async fn require_access(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        permission_name: &str,
    ) -> Result<(), AuthzError> {
        if self.can_access(user_id, permission_name).await? {
            return Ok(());
        }

        self.audit_logger
            .log_access_denied(ctx, user_id, permission_name)
            .await?;

        tracing::warn!("Access denied: user {} lacks {}", user_id, permission_name);

        Err(AuthzError::access_denied(user_id, permission_name))
    }
}
