use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod password;
pub mod session;
pub use endpoints::*;

pub type UserId = TypedId<User>;
pub type UserRoleId = TypedId<UserRole>;

const SESSION_TOKEN_LENGTH: usize = 48;

#[derive(Clone, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

// keeps password hashes out of traces
impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .finish()
    }
}

impl TypedIdMarker for User {
    fn tag() -> &'static str {
        "USR"
    }
}

/// Display details for an account; one per user, keyed by the user id.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Profile {
    #[serde(rename = "_id")]
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserRole {
    #[serde(rename = "_id")]
    pub id: UserRoleId,
    pub user_id: UserId,
    pub role: Role,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for UserRole {
    fn tag() -> &'static str {
        "ROL"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> SessionToken {
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_TOKEN_LENGTH)
            .map(char::from)
            .collect();

        SessionToken(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> SessionToken {
        SessionToken(token)
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "SessionToken({}…)", prefix)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub token: SessionToken,
    pub user_id: UserId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Emails are matched case-insensitively, so they are stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_long_and_distinct() {
        let first = SessionToken::generate();
        let second = SessionToken::generate();

        assert_eq!(first.as_str().len(), 48);
        assert!(first.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }

    #[test]
    fn session_tokens_are_not_logged_in_full() {
        let token = SessionToken::from("abcdefghijklmnop".to_string());

        assert_eq!(format!("{:?}", token), "SessionToken(abcd…)");
    }

    #[test]
    fn user_debug_omits_the_password_hash() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: "asha@example.org".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: now,
            modified_at: now,
        };

        assert!(!format!("{:?}", user).contains("argon2id"));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Asha@Example.ORG "), "asha@example.org");
    }
}
