use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{JwtResponse, LoginRequest, MessageResponse, SignupRequest},
};
use crate::shared::{ApiJson, AppError, AppState};

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.token_authority),
    )
}

/// HTTP handler for account registration
///
/// POST /api/auth/register
#[instrument(name = "register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    info!(email = %request.email, "Registering new user");

    let response = auth_service(&state).register(request).await?;
    Ok(Json(response))
}

/// HTTP handler for login
///
/// POST /api/auth/login
/// Returns a signed bearer token for the account
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<JwtResponse>, AppError> {
    info!(email = %request.email, "Login attempt");

    let response = auth_service(&state).login(request).await?;
    Ok(Json(response))
}
