use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{service::TeacherService, types::TeacherResponse};
use crate::shared::{AppError, AppState};

/// GET /api/teacher
#[instrument(name = "list_teachers", skip(state))]
pub async fn list_teachers(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherResponse>>, AppError> {
    let service = TeacherService::new(Arc::clone(&state.teacher_repository));
    let teachers = service.find_all().await?;

    info!(teacher_count = teachers.len(), "Teachers listed successfully");
    Ok(Json(teachers))
}

/// GET /api/teacher/:id
#[instrument(name = "find_teacher_by_id", skip(state))]
pub async fn find_teacher_by_id(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
) -> Result<Json<TeacherResponse>, AppError> {
    let service = TeacherService::new(Arc::clone(&state.teacher_repository));
    Ok(Json(service.find_by_id(teacher_id).await?))
}
