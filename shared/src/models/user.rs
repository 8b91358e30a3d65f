//! User Model

use serde::{Deserialize, Serialize};

/// Access level of a shop user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Technician,
    #[default]
    Attendant,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [Self::Admin, Self::Technician, Self::Attendant];

    /// Wire code, e.g. `TECHNICIAN`
    pub fn code(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Technician => "TECHNICIAN",
            Self::Attendant => "ATTENDANT",
        }
    }

    /// Parse a wire code, case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase();
        Self::ALL.into_iter().find(|r| r.code() == normalized)
    }
}

/// User response (without password)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
