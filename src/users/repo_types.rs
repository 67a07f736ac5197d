use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    #[default]
    Employee,
    #[serde(rename = "HR")]
    Hr,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Employee => write!(f, "Employee"),
            Role::Hr => write!(f, "HR"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

/// User directory record. The `salary` field here is the authoritative figure;
/// payment records carry denormalized copies of it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub salary: i64,
    pub bank_account: Option<String>,
    pub designation: Option<String>,
    pub photo_url: Option<String>,
    pub is_verified: bool,
    pub is_fired: bool,
    pub created_at: OffsetDateTime,
}

/// Insert arguments for a new directory record.
#[derive(Debug, Clone, Default)]
pub struct NewUserRecord {
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub salary: i64,
    pub bank_account: Option<String>,
    pub designation: Option<String>,
    pub photo_url: Option<String>,
    pub is_verified: bool,
    pub is_fired: bool,
}

/// Mirror of a document-store update result: `matched_count` rows satisfied
/// the filter, `modified_count` of them actually changed value.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"HR\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"Employee\"").unwrap(),
            Role::Employee
        );
    }

    #[test]
    fn user_serializes_camel_case() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            name: None,
            role: Role::Employee,
            salary: 1000,
            bank_account: None,
            designation: None,
            photo_url: None,
            is_verified: true,
            is_fired: false,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("isVerified").is_some());
        assert!(json.get("bankAccount").is_some());
    }
}
