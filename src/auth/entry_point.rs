use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Short reason phrase placed in the `error` field
pub const UNAUTHORIZED_REASON: &str = "Unauthorized";

/// Body written when a request reaches a protected resource without valid credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnauthorizedBody {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl UnauthorizedBody {
    pub fn new(message: &str, path: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED.as_u16(),
            error: UNAUTHORIZED_REASON.to_string(),
            message: message.to_string(),
            path: path.to_string(),
        }
    }
}

/// Terminal 401 response for a denied request
pub fn unauthorized(message: &str, path: &str) -> Response {
    warn!(path = %path, "Unauthorized error: {}", message);

    (
        StatusCode::UNAUTHORIZED,
        Json(UnauthorizedBody::new(message, path)),
    )
        .into_response()
}
