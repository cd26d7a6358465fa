// Public API - what other modules can use
pub use handlers::{find_teacher_by_id, list_teachers};
pub use repository::{InMemoryTeacherRepository, PostgresTeacherRepository, TeacherRepository};
pub use types::TeacherResponse;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
