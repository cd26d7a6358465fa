use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    password::{hash_password_blocking, verify_password_blocking},
    token::TokenAuthority,
    types::{JwtResponse, LoginRequest, MessageResponse, SignupRequest},
};
use crate::shared::AppError;
use crate::user::{models::NewUser, UserRepository};

const BAD_CREDENTIALS: &str = "Bad credentials";

/// Registration and login
pub struct AuthService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    token_authority: Arc<TokenAuthority>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        token_authority: Arc<TokenAuthority>,
    ) -> Self {
        Self {
            user_repository,
            token_authority,
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: SignupRequest) -> Result<MessageResponse, AppError> {
        request.validate()?;

        if self.user_repository.exists_by_email(&request.email).await? {
            warn!("Registration refused, email already taken");
            return Err(AppError::EmailTaken);
        }

        let password = hash_password_blocking(request.password).await?;
        let user = self
            .user_repository
            .create_user(&NewUser {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password,
                admin: false,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(MessageResponse::new("User registered successfully!"))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<JwtResponse, AppError> {
        request.validate()?;

        let Some(user) = self.user_repository.find_by_email(&request.email).await? else {
            warn!("Login refused, unknown email");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !verify_password_blocking(request.password, user.password.clone()).await? {
            warn!(user_id = user.id, "Login refused, wrong password");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let token = self.issue_token(&user.email)?;

        info!(user_id = user.id, "User logged in");
        Ok(JwtResponse {
            token,
            token_type: "Bearer".to_string(),
            id: user.id,
            username: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            admin: user.admin,
        })
    }

    /// Signing failures here are server faults, not bad credentials
    fn issue_token(&self, email: &str) -> Result<String, AppError> {
        self.token_authority.issue(email).map_err(|e| {
            warn!(error = %e, "Failed to sign token for authenticated user");
            AppError::Internal
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::test_token_authority;
    use crate::user::InMemoryUserRepository;

    fn service() -> (AuthService, Arc<InMemoryUserRepository>, Arc<TokenAuthority>) {
        let users = Arc::new(InMemoryUserRepository::new());
        let authority = Arc::new(test_token_authority());
        (
            AuthService::new(users.clone(), authority.clone()),
            users,
            authority,
        )
    }

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            password: "password123".to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hashed_password() {
        let (service, users, _) = service();

        let response = service.register(signup("test@test.com")).await.unwrap();
        assert_eq!(response.message, "User registered successfully!");

        let stored = users.find_by_email("test@test.com").await.unwrap().unwrap();
        assert_ne!(stored.password, "password123");
        assert!(!stored.admin);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, users, _) = service();
        service.register(signup("test@test.com")).await.unwrap();

        let result = service.register(signup("test@test.com")).await;

        assert!(matches!(result, Err(AppError::EmailTaken)));
        assert_eq!(users.user_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_of_one_email() {
        let (service, users, _) = service();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.register(signup("race@studio.com")).await })
            })
            .collect();

        let mut registered = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => registered += 1,
                Err(e) => assert!(matches!(e, AppError::EmailTaken), "unexpected error: {e}"),
            }
        }

        assert_eq!(registered, 1);
        assert_eq!(users.user_count(), 1);
    }

    #[tokio::test]
    async fn test_login_issues_token_for_email() {
        let (service, _, authority) = service();
        service.register(signup("test@test.com")).await.unwrap();

        let response = service
            .login(login("test@test.com", "password123"))
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.username, "test@test.com");
        assert!(authority.validate(&response.token));
        assert_eq!(
            authority.parse_subject(&response.token).unwrap(),
            "test@test.com"
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _, _) = service();
        service.register(signup("test@test.com")).await.unwrap();

        let result = service.login(login("test@test.com", "password124")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_signing_failure_is_internal_error() {
        let (service, _, _) = service();

        let result = service.issue_token("");
        assert!(matches!(result, Err(AppError::Internal)));
        assert_eq!(
            result.unwrap_err().status_code(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (service, _, _) = service();

        let result = service.login(login("nobody@test.com", "password123")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
