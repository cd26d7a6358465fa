use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::token::{TokenAuthority, TokenError};
use crate::session::repository::{InMemorySessionRepository, SessionRepository};
use crate::teacher::{
    models::studio_roster,
    repository::{InMemoryTeacherRepository, TeacherRepository},
};
use crate::user::repository::{InMemoryUserRepository, UserRepository};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub teacher_repository: Arc<dyn TeacherRepository + Send + Sync>,
    pub session_repository: Arc<dyn SessionRepository + Send + Sync>,
    pub token_authority: Arc<TokenAuthority>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        teacher_repository: Arc<dyn TeacherRepository + Send + Sync>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        token_authority: Arc<TokenAuthority>,
    ) -> Self {
        Self {
            user_repository,
            teacher_repository,
            session_repository,
            token_authority,
        }
    }

    /// State backed by in-memory stores, with the studio roster already seeded
    pub fn in_memory(token_authority: Arc<TokenAuthority>) -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTeacherRepository::with_teachers(&studio_roster())),
            Arc::new(InMemorySessionRepository::new()),
            token_authority,
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Error: Email is already taken!")]
    EmailTaken,

    #[error("User {user_id} already participates in session {session_id}")]
    AlreadyParticipating { session_id: i64, user_id: i64 },

    #[error("User {user_id} does not participate in session {session_id}")]
    NotParticipating { session_id: i64, user_id: i64 },

    #[error("Session {0} not found")]
    SessionNotFound(i64),

    #[error("Principal not found: {0}")]
    PrincipalNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Token(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::EmailTaken
            | AppError::AlreadyParticipating { .. }
            | AppError::NotParticipating { .. } => StatusCode::BAD_REQUEST,
            AppError::SessionNotFound(_)
            | AppError::PrincipalNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections render as a 400 `AppError` body
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participation_errors_are_client_errors() {
        let already = AppError::AlreadyParticipating {
            session_id: 1,
            user_id: 2,
        };
        let absent = AppError::NotParticipating {
            session_id: 1,
            user_id: 2,
        };
        assert_eq!(already.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(absent.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::SessionNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::PrincipalNotFound("a@b.c".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AppError::NotFound("Teacher not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "error": "Teacher not found" }));
    }

    #[tokio::test]
    async fn test_email_taken_is_bad_request() {
        let response = AppError::EmailTaken.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "error": "Error: Email is already taken!" }));
    }

    #[tokio::test]
    async fn test_in_memory_state_has_studio_roster() {
        let state = AppState::in_memory(Arc::new(test_utils::test_token_authority()));

        let teachers = state.teacher_repository.list_teachers().await.unwrap();
        assert_eq!(teachers.len(), 2);
        assert!(state.teacher_repository.get_teacher(1).await.unwrap().is_some());
        assert!(state.session_repository.list_sessions().await.unwrap().is_empty());
    }
}
