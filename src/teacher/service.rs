use std::sync::Arc;
use tracing::{debug, instrument};

use super::{repository::TeacherRepository, types::TeacherResponse};
use crate::shared::AppError;

/// Service for handling teacher lookups
pub struct TeacherService {
    repository: Arc<dyn TeacherRepository + Send + Sync>,
}

impl TeacherService {
    pub fn new(repository: Arc<dyn TeacherRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<TeacherResponse>, AppError> {
        let teachers = self.repository.list_teachers().await?;
        debug!(teacher_count = teachers.len(), "Teachers listed");

        Ok(teachers.into_iter().map(TeacherResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, teacher_id: i64) -> Result<TeacherResponse, AppError> {
        self.repository
            .get_teacher(teacher_id)
            .await?
            .map(TeacherResponse::from)
            .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))
    }
}
