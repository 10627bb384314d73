use serde::Deserialize;

/// Request payload for creating a role.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

/// Partial role update. `None` fields are left untouched.
///
/// Renaming is rejected for system roles by the lifecycle service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

/// Request payload for creating a permission. The canonical name is
/// computed as `module:action` by the lifecycle service.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPermission {
    pub module: String,
    pub action: String,
    pub description: Option<String>,
}
