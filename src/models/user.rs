use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A registered account.
///
/// `password_hash` and `salt` never leave the server; they are skipped on serialization.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Hex-encoded 16-byte salt, generated once at sign-up.
    #[serde(skip_serializing)]
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

/// Everything a credential store needs to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub salt: String,
}
