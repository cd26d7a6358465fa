use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewTeacher, TeacherModel};
use crate::shared::AppError;

/// Trait for teacher repository operations
#[async_trait]
pub trait TeacherRepository {
    async fn create_teacher(&self, teacher: &NewTeacher) -> Result<TeacherModel, AppError>;
    async fn get_teacher(&self, teacher_id: i64) -> Result<Option<TeacherModel>, AppError>;
    /// All teachers ordered by id
    async fn list_teachers(&self) -> Result<Vec<TeacherModel>, AppError>;
}

struct TeacherTable {
    rows: BTreeMap<i64, TeacherModel>,
    next_id: i64,
}

/// In-memory implementation of TeacherRepository for development and testing
pub struct InMemoryTeacherRepository {
    teachers: Mutex<TeacherTable>,
}

impl Default for InMemoryTeacherRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTeacherRepository {
    pub fn new() -> Self {
        Self {
            teachers: Mutex::new(TeacherTable {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Creates a repository pre-populated with `teachers`, ids assigned in order
    pub fn with_teachers(teachers: &[NewTeacher]) -> Self {
        let repo = Self::new();
        {
            let mut table = repo.teachers.lock().unwrap();
            for teacher in teachers {
                let id = table.next_id;
                table.next_id += 1;
                table.rows.insert(id, TeacherModel::from_new(id, teacher));
            }
        }
        repo
    }
}

#[async_trait]
impl TeacherRepository for InMemoryTeacherRepository {
    #[instrument(skip(self, teacher))]
    async fn create_teacher(&self, teacher: &NewTeacher) -> Result<TeacherModel, AppError> {
        let mut teachers = self.teachers.lock().unwrap();
        let id = teachers.next_id;
        teachers.next_id += 1;

        let model = TeacherModel::from_new(id, teacher);
        teachers.rows.insert(id, model.clone());

        debug!(teacher_id = id, "Teacher created successfully in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_teacher(&self, teacher_id: i64) -> Result<Option<TeacherModel>, AppError> {
        let teachers = self.teachers.lock().unwrap();
        let teacher = teachers.rows.get(&teacher_id).cloned();

        match &teacher {
            Some(t) => debug!(teacher_id, last_name = %t.last_name, "Teacher found in memory"),
            None => debug!(teacher_id, "Teacher not found in memory"),
        }

        Ok(teacher)
    }

    #[instrument(skip(self))]
    async fn list_teachers(&self) -> Result<Vec<TeacherModel>, AppError> {
        let teachers = self.teachers.lock().unwrap();
        Ok(teachers.rows.values().cloned().collect())
    }
}

/// PostgreSQL implementation of teacher repository
pub struct PostgresTeacherRepository {
    pool: PgPool,
}

impl PostgresTeacherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeacherRepository for PostgresTeacherRepository {
    #[instrument(skip(self, teacher))]
    async fn create_teacher(&self, teacher: &NewTeacher) -> Result<TeacherModel, AppError> {
        sqlx::query_as::<_, TeacherModel>(
            "INSERT INTO teachers (first_name, last_name) VALUES ($1, $2) \
             RETURNING id, first_name, last_name, created_at, updated_at",
        )
        .bind(&teacher.first_name)
        .bind(&teacher.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create teacher in database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn get_teacher(&self, teacher_id: i64) -> Result<Option<TeacherModel>, AppError> {
        sqlx::query_as::<_, TeacherModel>(
            "SELECT id, first_name, last_name, created_at, updated_at FROM teachers WHERE id = $1",
        )
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, teacher_id, "Failed to fetch teacher from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn list_teachers(&self) -> Result<Vec<TeacherModel>, AppError> {
        sqlx::query_as::<_, TeacherModel>(
            "SELECT id, first_name, last_name, created_at, updated_at FROM teachers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list teachers from database");
            AppError::DatabaseError(e.to_string())
        })
    }
}
