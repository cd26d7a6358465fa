use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{repository::UserRepository, types::UserResponse};
use crate::{auth::AuthenticatedUser, session::SessionRepository, shared::AppError};

/// Service for handling user business logic
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    session_repository: Arc<dyn SessionRepository + Send + Sync>,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            session_repository,
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, user_id: i64) -> Result<UserResponse, AppError> {
        self.repository
            .get_user(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Deletes an account; only its owner may do so
    #[instrument(skip(self, requester), fields(requester = %requester.email))]
    pub async fn delete(
        &self,
        user_id: i64,
        requester: &AuthenticatedUser,
    ) -> Result<(), AppError> {
        let user = self
            .repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.email != requester.email {
            warn!(
                user_id,
                owner = %user.email,
                "Refusing to delete another user's account"
            );
            return Err(AppError::Unauthorized(
                "Cannot delete another user's account".to_string(),
            ));
        }

        let left = self.session_repository.remove_user_from_all(user_id).await?;
        self.repository.delete_user(user_id).await?;

        info!(user_id, sessions_left = left, "User deleted");
        Ok(())
    }
}
