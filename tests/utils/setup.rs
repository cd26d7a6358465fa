use std::sync::Arc;

use axum::Router;
use yoga_api::{
    create_router,
    session::InMemorySessionRepository,
    teacher::{models::NewTeacher, InMemoryTeacherRepository, TeacherRepository},
    user::InMemoryUserRepository,
    AppState, TokenAuthority, TokenConfig,
};

pub const TEST_SECRET: &str = "testSecret";
pub const ONE_HOUR_MS: i64 = 3_600_000;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A fully wired router backed by in-memory stores
pub struct TestApp {
    pub router: Router,
    pub token_authority: Arc<TokenAuthority>,
    pub users: Arc<InMemoryUserRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub teacher_ids: Vec<i64>,
}

pub struct TestAppBuilder {
    teachers: Vec<(String, String)>,
    expiration_ms: i64,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            teachers: vec![],
            expiration_ms: ONE_HOUR_MS,
        }
    }

    pub fn with_teacher(mut self, first_name: &str, last_name: &str) -> Self {
        self.teachers
            .push((first_name.to_string(), last_name.to_string()));
        self
    }

    pub fn with_two_teachers(self) -> Self {
        self.with_teacher("Margot", "Delahaye")
            .with_teacher("Hélène", "Thiercelin")
    }

    pub async fn build(self) -> TestApp {
        let users = Arc::new(InMemoryUserRepository::new());
        let teachers = Arc::new(InMemoryTeacherRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let token_authority = Arc::new(TokenAuthority::new(TokenConfig::new(
            TEST_SECRET,
            self.expiration_ms,
        )));

        // Teachers have no HTTP write surface, so they are seeded directly
        let mut teacher_ids = Vec::with_capacity(self.teachers.len());
        for (first_name, last_name) in &self.teachers {
            let teacher = teachers
                .create_teacher(&NewTeacher::new(first_name.as_str(), last_name.as_str()))
                .await
                .unwrap();
            teacher_ids.push(teacher.id);
        }

        let state = AppState::new(
            users.clone(),
            teachers,
            sessions.clone(),
            token_authority.clone(),
        );

        TestApp {
            router: create_router(state),
            token_authority,
            users,
            sessions,
            teacher_ids,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
