use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account type chosen during onboarding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Student,
    Professional,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Professional => "professional",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            UserType::Student => UserType::Professional,
            UserType::Professional => UserType::Student,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "student" => Some(UserType::Student),
            "professional" => Some(UserType::Professional),
            _ => None,
        }
    }
}

/// Row of the auth library's `user` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub user_type: Option<String>,
}

impl User {
    /// The onboarding type, if one has been chosen and is recognised.
    pub fn kind(&self) -> Option<UserType> {
        self.user_type.as_deref().and_then(UserType::parse)
    }
}

/// Row of the auth library's `session` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub expires_at: NaiveDateTime,
    pub token: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub user_id: String,
}
