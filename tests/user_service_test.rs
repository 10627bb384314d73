mod common;

use agentex_authz::errors::AuthzError;
use agentex_authz::services::{PermissionResolver, RoleService, UserService};
use agentex_authz::types::db::user_role::Entity as UserRole;
use agentex_authz::types::dto::{NewUser, ProfileUpdate};
use common::{new_user, setup_app_data, test_ctx};
use sea_orm::EntityTrait;

#[tokio::test]
async fn create_user_rejects_duplicate_username_and_email() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data);
    let ctx = test_ctx();

    users.create_user(&ctx, new_user("alice")).await.unwrap();

    let same_username = users.create_user(&ctx, new_user("alice")).await;
    assert!(matches!(same_username, Err(AuthzError::Conflict { .. })));

    let same_email = users
        .create_user(
            &ctx,
            NewUser {
                username: "alice2".to_string(),
                email: "alice@example.com".to_string(),
                hashed_password: "hash".to_string(),
                avatar_url: None,
                is_superuser: false,
            },
        )
        .await;
    assert!(matches!(same_email, Err(AuthzError::Conflict { .. })));
}

#[tokio::test]
async fn new_users_receive_the_default_role_when_seeded() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data);
    let ctx = test_ctx();

    roles.seed_defaults(&ctx).await.unwrap();

    let user = users.create_user(&ctx, new_user("alice")).await.unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert!(resolved.contains("chat:use"));
    assert!(resolved.contains("agents:use"));
    assert_eq!(resolved.len(), 2);
}

#[tokio::test]
async fn users_created_before_seeding_have_no_roles() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let resolver = PermissionResolver::new(app_data);
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("early")).await.unwrap();

    let resolved = resolver.resolve(&user.id).await.unwrap();
    assert!(resolved.is_empty());
}

#[tokio::test]
async fn update_profile_enforces_uniqueness_among_live_users() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data);
    let ctx = test_ctx();

    users.create_user(&ctx, new_user("alice")).await.unwrap();
    let bob = users.create_user(&ctx, new_user("bob")).await.unwrap();

    let taken = users
        .update_profile(
            &ctx,
            &bob.id,
            ProfileUpdate {
                username: Some("alice".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(taken, Err(AuthzError::Conflict { .. })));

    let updated = users
        .update_profile(
            &ctx,
            &bob.id,
            ProfileUpdate {
                username: Some("robert".to_string()),
                avatar_url: Some("https://cdn.example.com/robert.png".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "robert");
    assert_eq!(
        updated.avatar_url.as_deref(),
        Some("https://cdn.example.com/robert.png")
    );
}

#[tokio::test]
async fn update_profile_keeping_own_username_is_not_a_conflict() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data);
    let ctx = test_ctx();

    let alice = users.create_user(&ctx, new_user("alice")).await.unwrap();

    let updated = users
        .update_profile(
            &ctx,
            &alice.id,
            ProfileUpdate {
                username: Some("alice".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "alice");
}

#[tokio::test]
async fn soft_deleted_users_disappear_from_reads_but_keep_assignments() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data.clone());
    let roles = RoleService::new(app_data.clone());
    let ctx = test_ctx();

    roles.seed_defaults(&ctx).await.unwrap();
    let user = users.create_user(&ctx, new_user("alice")).await.unwrap();

    users.soft_delete_user(&ctx, &user.id).await.unwrap();

    let fetched = users.get_user(&user.id).await;
    assert!(matches!(fetched, Err(AuthzError::NotFound { .. })));
    assert!(users.list_users().await.unwrap().is_empty());

    // The default-role assignment row survives for audit
    let rows = UserRole::find()
        .all(&app_data.connections.rbac)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn soft_deleted_usernames_stay_reserved() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data);
    let ctx = test_ctx();

    let first = users.create_user(&ctx, new_user("alice")).await.unwrap();
    users.soft_delete_user(&ctx, &first.id).await.unwrap();

    // The schema's unique index spans soft-deleted rows
    let reuse = users.create_user(&ctx, new_user("alice")).await;
    assert!(matches!(reuse, Err(AuthzError::Conflict { .. })));
}

#[tokio::test]
async fn record_login_stamps_the_timestamp() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data);
    let ctx = test_ctx();

    let user = users.create_user(&ctx, new_user("alice")).await.unwrap();
    assert!(user.last_login_at.is_none());

    users.record_login(&user.id).await.unwrap();

    let fetched = users.get_user(&user.id).await.unwrap();
    assert!(fetched.last_login_at.is_some());
}

#[tokio::test]
async fn flag_updates_fail_with_not_found_for_unknown_users() {
    let app_data = setup_app_data().await;
    let users = UserService::new(app_data);
    let ctx = test_ctx();

    let result = users.set_active(&ctx, "no-such-user", false).await;
    assert!(matches!(result, Err(AuthzError::NotFound { .. })));

    let result = users.set_superuser(&ctx, "no-such-user", true).await;
    assert!(matches!(result, Err(AuthzError::NotFound { .. })));
}
