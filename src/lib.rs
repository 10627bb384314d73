// Authorization engine: RBAC data model, permission resolution and access checks

pub mod app_data;
pub mod audit;
pub mod config;
pub mod errors;
pub mod services;
pub mod stores;
pub mod types;

pub use app_data::AppData;
pub use errors::AuthzError;
pub use services::{AssignmentService, AuthorizationGuard, PermissionResolver, RoleService, UserService};
pub use types::internal::{RequestContext, ResolvedPermissions};
