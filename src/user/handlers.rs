use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{service::UserService, types::UserResponse};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppState};

fn user_service(state: &AppState) -> UserService {
    UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.session_repository),
    )
}

/// GET /api/user/:id
#[instrument(name = "find_user_by_id", skip(state))]
pub async fn find_user_by_id(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let service = user_service(&state);
    let user = service.find_by_id(user_id).await?;

    info!(user_id, "User fetched");
    Ok(Json(user))
}

/// DELETE /api/user/:id
/// Only the authenticated owner of the account may delete it
#[instrument(name = "delete_user", skip(state, requester))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(requester): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let service = user_service(&state);
    service.delete(user_id, &requester).await?;

    Ok(StatusCode::OK)
}
