use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Role;

fn default_role() -> Role {
    Role::Employee
}

/// Body for POST /users.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub email: String,
    pub name: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub salary: i64,
    pub bank_account: Option<String>,
    pub designation: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_fired: bool,
}

/// Registration is idempotent: a repeat email yields a null `insertedId`
/// and no mutation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub inserted_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
}

/// Body for PATCH /users/:id. A present `salary` routes the request through
/// the salary synchronizer; any other subset is a plain profile patch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub salary: Option<i64>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub bank_account: Option<String>,
    pub designation: Option<String>,
    pub photo_url: Option<String>,
    pub is_verified: Option<bool>,
    pub is_fired: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub user_role: Role,
    pub is_admin: bool,
    #[serde(rename = "isHR")]
    pub is_hr: bool,
    pub is_employee: bool,
}
