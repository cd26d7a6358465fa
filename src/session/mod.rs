// Public API - what other modules can use
pub use handlers::{
    create_session, delete_session, find_session_by_id, list_sessions, no_longer_participate,
    participate, update_session,
};
pub use repository::{InMemorySessionRepository, PostgresSessionRepository, SessionRepository};
pub use types::SessionDto;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
mod types;
