// Public API - what other modules can use
pub use handlers::{delete_user, find_user_by_id};
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
pub use types::UserResponse;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
mod types;
