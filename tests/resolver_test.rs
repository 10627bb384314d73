mod common;

use agentex_authz::errors::AuthzError;
use agentex_authz::services::{
    AssignmentService, PermissionResolver, RoleService, UserService,
};
use agentex_authz::types::internal::ResolvedPermissions;
use common::{new_permission, new_role, new_superuser, new_user, setup_app_data, test_ctx};

#[tokio::test]
async fn unknown_user_fails_with_not_found() {
    let app_data = setup_app_data().await;
    let resolver = PermissionResolver::new(app_data);

    let result = resolver.resolve("no-such-user").await;
    assert!(matches!(result, Err(AuthzError::NotFound { .. })));
}

#[tokio::test]
async fn user_without_roles_resolves_to_empty_set() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data);
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("alice")).await.unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert!(resolved.is_empty());
    assert!(!resolved.is_wildcard());
}

#[tokio::test]
async fn inactive_user_resolves_to_empty_set_despite_superuser() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data);
    let ctx = test_ctx();

    let user = users
        .create_user(&ctx, new_superuser("root"))
        .await
        .unwrap();
    users.set_active(&ctx, &user.id, false).await.unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert_eq!(resolved, ResolvedPermissions::empty());
}

#[tokio::test]
async fn soft_deleted_user_resolves_to_empty_set() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data);
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("bob")).await.unwrap();
    users.soft_delete_user(&ctx, &user.id).await.unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert!(resolved.is_empty());
}

#[tokio::test]
async fn active_superuser_resolves_to_wildcard() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data);
    let ctx = test_ctx();

    let user = users
        .create_user(&ctx, new_superuser("root"))
        .await
        .unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert!(resolved.is_wildcard());
    assert!(resolved.contains("literally:anything"));
}

#[tokio::test]
async fn permissions_union_across_roles_without_double_counting() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data);
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("carol")).await.unwrap();

    let shared = roles
        .create_permission(&ctx, new_permission("reports", "view"))
        .await
        .unwrap();
    let extra = roles
        .create_permission(&ctx, new_permission("reports", "export"))
        .await
        .unwrap();

    let first = roles.create_role(&ctx, new_role("analyst")).await.unwrap();
    let second = roles.create_role(&ctx, new_role("auditor")).await.unwrap();

    // Both roles grant reports:view; only one grants reports:export
    assignments
        .grant_permission(&ctx, &first.id, &shared.id)
        .await
        .unwrap();
    assignments
        .grant_permission(&ctx, &second.id, &shared.id)
        .await
        .unwrap();
    assignments
        .grant_permission(&ctx, &second.id, &extra.id)
        .await
        .unwrap();

    assignments
        .assign_role(&ctx, &user.id, &first.id)
        .await
        .unwrap();
    assignments
        .assign_role(&ctx, &user.id, &second.id)
        .await
        .unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert_eq!(resolved.len(), 2);
    assert!(resolved.contains("reports:view"));
    assert!(resolved.contains("reports:export"));
}

#[tokio::test]
async fn assignment_changes_flow_through_resolution() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data);
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("dave")).await.unwrap();

    let resources_edit = roles
        .create_permission(&ctx, new_permission("resources", "edit"))
        .await
        .unwrap();
    let rules_view = roles
        .create_permission(&ctx, new_permission("rules", "view"))
        .await
        .unwrap();
    let chat_use = roles
        .create_permission(&ctx, new_permission("chat", "use"))
        .await
        .unwrap();

    let developer = roles.create_role(&ctx, new_role("developer")).await.unwrap();
    let baseline = roles.create_role(&ctx, new_role("member")).await.unwrap();

    assignments
        .grant_permission(&ctx, &developer.id, &resources_edit.id)
        .await
        .unwrap();
    assignments
        .grant_permission(&ctx, &developer.id, &rules_view.id)
        .await
        .unwrap();
    assignments
        .grant_permission(&ctx, &baseline.id, &chat_use.id)
        .await
        .unwrap();

    assignments
        .assign_role(&ctx, &user.id, &developer.id)
        .await
        .unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert_eq!(resolved.len(), 2);
    assert!(resolved.contains("resources:edit"));
    assert!(resolved.contains("rules:view"));

    assignments
        .assign_role(&ctx, &user.id, &baseline.id)
        .await
        .unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert_eq!(resolved.len(), 3);
    assert!(resolved.contains("chat:use"));

    assignments
        .revoke_role(&ctx, &user.id, &developer.id)
        .await
        .unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert!(resolved.contains("chat:use"));
    assert!(!resolved.contains("resources:edit"));
}

#[tokio::test]
async fn soft_deleted_role_is_excluded_from_resolution_but_keeps_grants() {
    use agentex_authz::types::db::role_permission::Entity as RolePermission;
    use sea_orm::EntityTrait;

    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data.clone());
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("erin")).await.unwrap();
    let permission = roles
        .create_permission(&ctx, new_permission("rules", "edit"))
        .await
        .unwrap();
    let role = roles.create_role(&ctx, new_role("editor")).await.unwrap();

    assignments
        .grant_permission(&ctx, &role.id, &permission.id)
        .await
        .unwrap();
    assignments
        .assign_role(&ctx, &user.id, &role.id)
        .await
        .unwrap();

    assert!(resolver.resolve(&user.id).await.unwrap().contains("rules:edit"));

    roles.soft_delete_role(&ctx, &role.id).await.unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert!(resolved.is_empty());

    // Grant rows survive the soft delete for audit purposes
    let remaining = RolePermission::find()
        .all(&app_data.connections.rbac)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
}
