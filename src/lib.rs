// Library crate for the yoga studio booking API
// This file exposes the public API for integration tests

pub mod auth;
pub mod config;
pub mod routes;
pub mod session;
pub mod shared;
pub mod teacher;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use auth::{TokenAuthority, TokenConfig, TokenError};
pub use config::AppConfig;
pub use routes::create_router;
pub use shared::{AppError, AppState};
