mod common;

use agentex_authz::errors::AuthzError;
use agentex_authz::services::{AssignmentService, RoleService, UserService};
use agentex_authz::types::db::user_role::Entity as UserRole;
use common::{new_permission, new_role, new_user, setup_app_data, test_ctx};
use sea_orm::EntityTrait;

#[tokio::test]
async fn assign_role_creates_exactly_one_row_and_duplicates_conflict() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("alice")).await.unwrap();
    let role = roles.create_role(&ctx, new_role("analyst")).await.unwrap();

    assignments
        .assign_role(&ctx, &user.id, &role.id)
        .await
        .unwrap();

    let second = assignments.assign_role(&ctx, &user.id, &role.id).await;
    assert!(matches!(second, Err(AuthzError::Conflict { .. })));

    let rows = UserRole::find()
        .all(&app_data.connections.rbac)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn ensure_role_treats_existing_assignment_as_success() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("bob")).await.unwrap();
    let role = roles.create_role(&ctx, new_role("analyst")).await.unwrap();

    assignments
        .ensure_role(&ctx, &user.id, &role.id)
        .await
        .unwrap();
    assignments
        .ensure_role(&ctx, &user.id, &role.id)
        .await
        .unwrap();

    let rows = UserRole::find()
        .all(&app_data.connections.rbac)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn assign_role_fails_with_not_found_for_missing_parties() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("carol")).await.unwrap();
    let role = roles.create_role(&ctx, new_role("analyst")).await.unwrap();

    let missing_role = assignments.assign_role(&ctx, &user.id, "no-such-role").await;
    assert!(matches!(missing_role, Err(AuthzError::NotFound { .. })));

    let missing_user = assignments.assign_role(&ctx, "no-such-user", &role.id).await;
    assert!(matches!(missing_user, Err(AuthzError::NotFound { .. })));
}

#[tokio::test]
async fn assign_role_fails_with_not_found_for_soft_deleted_role() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("dave")).await.unwrap();
    let role = roles.create_role(&ctx, new_role("ghost")).await.unwrap();
    roles.soft_delete_role(&ctx, &role.id).await.unwrap();

    let result = assignments.assign_role(&ctx, &user.id, &role.id).await;
    assert!(matches!(result, Err(AuthzError::NotFound { .. })));
}

#[tokio::test]
async fn revoke_role_is_a_no_op_when_absent() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("erin")).await.unwrap();
    let role = roles.create_role(&ctx, new_role("analyst")).await.unwrap();

    // Never assigned: still Ok
    assignments
        .revoke_role(&ctx, &user.id, &role.id)
        .await
        .unwrap();

    assignments
        .assign_role(&ctx, &user.id, &role.id)
        .await
        .unwrap();
    assignments
        .revoke_role(&ctx, &user.id, &role.id)
        .await
        .unwrap();
    // Second revoke after removal: still Ok
    assignments
        .revoke_role(&ctx, &user.id, &role.id)
        .await
        .unwrap();

    let rows = UserRole::find()
        .all(&app_data.connections.rbac)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn grant_permission_conflicts_on_duplicates_and_allows_system_roles() {
    let app_data = setup_app_data().await;
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    roles.seed_defaults(&ctx).await.unwrap();

    let permission = roles
        .create_permission(&ctx, new_permission("reports", "view"))
        .await
        .unwrap();

    let system_role = roles
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.name == "manager")
        .unwrap();
    assert!(system_role.is_system);

    // System roles' permission sets stay editable
    assignments
        .grant_permission(&ctx, &system_role.id, &permission.id)
        .await
        .unwrap();

    let second = assignments
        .grant_permission(&ctx, &system_role.id, &permission.id)
        .await;
    assert!(matches!(second, Err(AuthzError::Conflict { .. })));

    assignments
        .revoke_permission(&ctx, &system_role.id, &permission.id)
        .await
        .unwrap();
    // Absent grant: no-op
    assignments
        .revoke_permission(&ctx, &system_role.id, &permission.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn grant_permission_fails_with_not_found_for_missing_permission() {
    let app_data = setup_app_data().await;
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let role = roles.create_role(&ctx, new_role("analyst")).await.unwrap();

    let result = assignments
        .grant_permission(&ctx, &role.id, "no-such-permission")
        .await;
    assert!(matches!(result, Err(AuthzError::NotFound { .. })));
}

#[tokio::test]
async fn list_roles_for_user_orders_by_assignment_and_skips_deleted() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("frank")).await.unwrap();
    let first = roles.create_role(&ctx, new_role("first")).await.unwrap();
    let second = roles.create_role(&ctx, new_role("second")).await.unwrap();
    let third = roles.create_role(&ctx, new_role("third")).await.unwrap();

    assignments
        .assign_role(&ctx, &user.id, &first.id)
        .await
        .unwrap();
    // Keep assignment timestamps distinct so creation order is observable
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    assignments
        .assign_role(&ctx, &user.id, &second.id)
        .await
        .unwrap();
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    assignments
        .assign_role(&ctx, &user.id, &third.id)
        .await
        .unwrap();

    roles.soft_delete_role(&ctx, &second.id).await.unwrap();

    let listed = assignments.list_roles_for_user(&user.id).await.unwrap();
    let names: Vec<String> = listed.into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["first".to_string(), "third".to_string()]);
}

#[tokio::test]
async fn list_permissions_for_role_returns_grants() {
    let app_data = setup_app_data().await;
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let role = roles.create_role(&ctx, new_role("analyst")).await.unwrap();
    let view = roles
        .create_permission(&ctx, new_permission("reports", "view"))
        .await
        .unwrap();
    let export = roles
        .create_permission(&ctx, new_permission("reports", "export"))
        .await
        .unwrap();

    assignments
        .grant_permission(&ctx, &role.id, &view.id)
        .await
        .unwrap();
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    assignments
        .grant_permission(&ctx, &role.id, &export.id)
        .await
        .unwrap();

    let listed = assignments
        .list_permissions_for_role(&role.id)
        .await
        .unwrap();
    let names: Vec<String> = listed.into_iter().map(|p| p.name).collect();
    assert_eq!(
        names,
        vec!["reports:view".to_string(), "reports:export".to_string()]
    );
}

#[tokio::test]
async fn listing_fails_with_not_found_for_soft_deleted_parents() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let assignments = AssignmentService::new(app_data.clone());
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("grace")).await.unwrap();
    users.soft_delete_user(&ctx, &user.id).await.unwrap();

    let listed = assignments.list_roles_for_user(&user.id).await;
    assert!(matches!(listed, Err(AuthzError::NotFound { .. })));

    let role = roles.create_role(&ctx, new_role("gone")).await.unwrap();
    roles.soft_delete_role(&ctx, &role.id).await.unwrap();

    let listed = assignments.list_permissions_for_role(&role.id).await;
    assert!(matches!(listed, Err(AuthzError::NotFound { .. })));
}
