use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewUser, UserModel};
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Fails with `AppError::EmailTaken` when the email is already registered
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError>;
    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError>;
}

struct UserTable {
    rows: BTreeMap<i64, UserModel>,
    next_id: i64,
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<UserTable>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(UserTable {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        debug!(email = %user.email, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.rows.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "User already exists in memory");
            return Err(AppError::EmailTaken);
        }

        let id = users.next_id;
        users.next_id += 1;
        let model = UserModel::from_new(id, user);
        users.rows.insert(id, model.clone());

        debug!(user_id = id, "User created successfully in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError> {
        debug!(user_id, "Fetching user from memory");

        let users = self.users.lock().unwrap();
        Ok(users.rows.get(&user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!(email = %email, "Fetching user by email from memory");

        let users = self.users.lock().unwrap();
        Ok(users.rows.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.rows.values().any(|u| u.email == email))
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        debug!(user_id, "Deleting user from memory");

        let mut users = self.users.lock().unwrap();
        if users.rows.remove(&user_id).is_none() {
            warn!(user_id, "User not found for deletion in memory");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!(user_id, "User deleted successfully from memory");
        Ok(())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password, admin, created_at, updated_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        debug!(email = %user.email, "Creating user in database");

        let query = format!(
            "INSERT INTO users (email, first_name, last_name, password, admin) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        let model = sqlx::query_as::<_, UserModel>(&query)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password)
            .bind(user.admin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_unique_violation() => {
                    warn!(email = %user.email, "User already exists in database");
                    AppError::EmailTaken
                }
                _ => {
                    warn!(error = %e, "Failed to create user in database");
                    AppError::DatabaseError(e.to_string())
                }
            })?;

        debug!(user_id = model.id, "User created successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError> {
        debug!(user_id, "Fetching user from database");

        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserModel>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id, "Failed to fetch user from database");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!(email = %email, "Fetching user by email from database");

        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserModel>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch user by email from database");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        debug!(user_id, "Deleting user from database");

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id, "Failed to delete user from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(user_id, "User not found for deletion");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!(user_id, "User deleted successfully from database");
        Ok(())
    }
}
