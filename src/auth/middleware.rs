use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, instrument, warn};

use super::{entry_point::unauthorized, types::AuthenticatedUser};
use crate::shared::AppState;

const MISSING_CREDENTIALS: &str = "Full authentication is required to access this resource";

/// JWT authentication middleware - validates Authorization Bearer header and adds AuthenticatedUser to request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(user): Extension<AuthenticatedUser>.
/// Any failure ends the request with the structured 401 body.
#[instrument(skip(state, req, next))]
pub async fn jwt_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    info!(path = %path, "JWT authentication middleware triggered");

    let token = match bearer_token(&req) {
        Some(token) => token,
        None => {
            warn!("Missing or malformed Authorization header in request");
            return unauthorized(MISSING_CREDENTIALS, &path);
        }
    };

    let authority = &state.token_authority;
    if !authority.validate(&token) {
        return unauthorized("Invalid or expired JWT token", &path);
    }

    let email = match authority.parse_subject(&token) {
        Ok(email) => email,
        Err(e) => {
            warn!("JWT authentication failed: {}", e);
            return unauthorized(&e.to_string(), &path);
        }
    };

    let user = match state.user_repository.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(email = %email, "Token subject does not match any user");
            return unauthorized("User not found", &path);
        }
        Err(e) => return e.into_response(),
    };

    info!(
        user_id = user.id,
        email = %user.email,
        "Authentication successful, adding user to request"
    );

    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        email: user.email,
    });

    next.run(req).await
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}
