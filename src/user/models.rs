use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: i64,
    pub email: String, // Unique, doubles as the principal identifier
    pub first_name: String,
    pub last_name: String,
    pub password: String, // Argon2 PHC string
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when registering a user; id and timestamps are assigned by the store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub admin: bool,
}

impl UserModel {
    /// Materialises a new user with the given id and fresh timestamps
    pub fn from_new(id: i64, user: &NewUser) -> Self {
        let now = Utc::now();

        Self {
            id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password: user.password.clone(),
            admin: user.admin,
            created_at: now,
            updated_at: now,
        }
    }
}
