// Common test utilities for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use agentex_authz::app_data::AppData;
use agentex_authz::config::DatabaseConnections;
use agentex_authz::types::dto::{NewPermission, NewRole, NewUser};
use agentex_authz::types::internal::RequestContext;
use migration::{AuditMigrator, MigratorTrait, RbacMigrator};
use sea_orm::Database;

/// Creates in-memory databases with migrations applied and wires AppData
pub async fn setup_app_data() -> Arc<AppData> {
    let rbac = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    RbacMigrator::up(&rbac, None)
        .await
        .expect("Failed to run migrations");

    let audit = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");

    AuditMigrator::up(&audit, None)
        .await
        .expect("Failed to run audit migrations");

    Arc::new(AppData::init(DatabaseConnections { rbac, audit }))
}

pub fn test_ctx() -> RequestContext {
    RequestContext::for_system("test")
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        hashed_password: "$argon2id$v=19$m=19456,t=2,p=1$test$testhash".to_string(),
        avatar_url: None,
        is_superuser: false,
    }
}

pub fn new_superuser(username: &str) -> NewUser {
    NewUser {
        is_superuser: true,
        ..new_user(username)
    }
}

pub fn new_role(name: &str) -> NewRole {
    NewRole {
        name: name.to_string(),
        display_name: format!("{} role", name),
        description: None,
    }
}

pub fn new_permission(module: &str, action: &str) -> NewPermission {
    NewPermission {
        module: module.to_string(),
        action: action.to_string(),
        description: None,
    }
}
