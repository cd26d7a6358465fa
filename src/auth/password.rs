use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, warn};

use crate::shared::AppError;

/// Hashes a password with Argon2id and a random salt, returning the PHC string
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            warn!(error = %e, "Argon2 hash error");
            AppError::Internal
        })?
        .to_string();

    debug!("Password hashed successfully with Argon2");
    Ok(hash)
}

/// Checks a password against a stored PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        warn!(error = %e, "Stored password hash could not be parsed");
        AppError::Internal
    })?;

    let matches = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    debug!(matches, "Password verification completed");
    Ok(matches)
}

/// Runs [`hash_password`] on the blocking thread pool
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password hashing task failed");
            AppError::Internal
        })?
}

/// Runs [`verify_password`] on the blocking thread pool
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password verification task failed");
            AppError::Internal
        })?
}
