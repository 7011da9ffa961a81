//! User and authentication models.

use serde::{Deserialize, Serialize};

use super::common::{Id, Role};

/// Account as listed by `/api/admin/user`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

impl User {
    pub fn status_label(&self) -> &'static str {
        if self.active {
            "Active"
        } else {
            "Blocked"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Body of a successful login.
///
/// Fields are optional on the wire; a response missing any of them does not
/// establish a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub role: Option<Role>,
}
