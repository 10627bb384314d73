use serde::{Deserialize, Serialize};

/// Request payload for creating a user.
///
/// The password arrives already hashed; hashing belongs to the
/// authentication layer, not this engine.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// User representation returned to administrative callers.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub last_login_at: Option<i64>,
    pub created_at: i64,
}

impl From<crate::types::db::user::Model> for UserSummary {
    fn from(u: crate::types::db::user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            avatar_url: u.avatar_url,
            is_active: u.is_active,
            is_superuser: u.is_superuser,
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}
