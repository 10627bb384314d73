pub mod role;
pub mod user;

pub use role::{NewPermission, NewRole, RoleUpdate};
pub use user::{NewUser, ProfileUpdate, UserSummary};
