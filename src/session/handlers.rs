use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{service::SessionService, types::SessionDto};
use crate::shared::{ApiJson, AppError, AppState};

fn session_service(state: &AppState) -> SessionService {
    SessionService::new(
        Arc::clone(&state.session_repository),
        Arc::clone(&state.teacher_repository),
        Arc::clone(&state.user_repository),
    )
}

/// HTTP handler for creating a new session
///
/// POST /api/session
#[instrument(name = "create_session", skip(state, request))]
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SessionDto>,
) -> Result<Json<SessionDto>, AppError> {
    info!(name = %request.name, "Creating new session");

    let session = session_service(&state).create(request).await?;
    Ok(Json(session))
}

/// GET /api/session
#[instrument(name = "list_sessions", skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionDto>>, AppError> {
    let sessions = session_service(&state).find_all().await?;

    info!(session_count = sessions.len(), "Sessions listed successfully");
    Ok(Json(sessions))
}

/// GET /api/session/:id
#[instrument(name = "find_session_by_id", skip(state))]
pub async fn find_session_by_id(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<SessionDto>, AppError> {
    Ok(Json(session_service(&state).get_by_id(session_id).await?))
}

/// PUT /api/session/:id
#[instrument(name = "update_session", skip(state, request))]
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    ApiJson(request): ApiJson<SessionDto>,
) -> Result<Json<SessionDto>, AppError> {
    let session = session_service(&state).update(session_id, request).await?;
    Ok(Json(session))
}

/// DELETE /api/session/:id
#[instrument(name = "delete_session", skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    session_service(&state).delete(session_id).await?;
    Ok(StatusCode::OK)
}

/// POST /api/session/:id/participate/:user_id
#[instrument(name = "participate", skip(state))]
pub async fn participate(
    State(state): State<AppState>,
    Path((session_id, user_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    session_service(&state)
        .participate(session_id, user_id)
        .await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/session/:id/participate/:user_id
#[instrument(name = "no_longer_participate", skip(state))]
pub async fn no_longer_participate(
    State(state): State<AppState>,
    Path((session_id, user_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    session_service(&state)
        .no_longer_participate(session_id, user_id)
        .await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::repository::{
        tests::helpers::yoga_session, InMemorySessionRepository, SessionRepository,
    };
    use crate::shared::test_utils::AppStateBuilder;
    use crate::teacher::{models::NewTeacher, InMemoryTeacherRepository, TeacherRepository};
    use axum::{
        body::Body,
        http::Request,
        routing::{get, post},
        Router,
    };
    use rstest::rstest;
    use tower::ServiceExt; // for `oneshot`

    async fn app() -> (Router, Arc<InMemorySessionRepository>, i64) {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let teachers = Arc::new(InMemoryTeacherRepository::new());
        let teacher = teachers
            .create_teacher(&NewTeacher::new("Jane", "Doe"))
            .await
            .unwrap();

        let app_state = AppStateBuilder::new()
            .with_session_repository(sessions.clone())
            .with_teacher_repository(teachers)
            .build();

        let router = Router::new()
            .route("/api/session", get(list_sessions).post(create_session))
            .route(
                "/api/session/:id",
                get(find_session_by_id)
                    .put(update_session)
                    .delete(delete_session),
            )
            .route(
                "/api/session/:id/participate/:user_id",
                post(participate).delete(no_longer_participate),
            )
            .with_state(app_state);

        (router, sessions, teacher.id)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_session_handler() {
        let (app, sessions, teacher_id) = app().await;

        let request = json_request(
            "POST",
            "/api/session",
            serde_json::json!({
                "name": "Yoga Session",
                "description": "A relaxing yoga session",
                "date": "2025-02-23T00:00:00Z",
                "teacher_id": teacher_id
            }),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let created: SessionDto = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.name, "Yoga Session");
        assert_eq!(created.description, "A relaxing yoga session");
        assert_eq!(sessions.session_count(), 1);
    }

    #[tokio::test]
    async fn test_create_session_missing_name() {
        let (app, sessions, teacher_id) = app().await;

        let request = json_request(
            "POST",
            "/api/session",
            serde_json::json!({
                "description": "A relaxing yoga session",
                "date": "2025-02-23T00:00:00Z",
                "teacher_id": teacher_id
            }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(sessions.session_count(), 0);
    }

    #[rstest]
    #[case::teacher_not_a_number(
        serde_json::json!("abc"),
        serde_json::json!("2025-02-23T00:00:00Z")
    )]
    #[case::unparseable_date(serde_json::json!(1), serde_json::json!("not-a-date"))]
    #[tokio::test]
    async fn test_create_session_malformed_payload(
        #[case] teacher_id: serde_json::Value,
        #[case] date: serde_json::Value,
    ) {
        let (app, sessions, _) = app().await;

        let request = json_request(
            "POST",
            "/api/session",
            serde_json::json!({
                "name": "Yoga Session",
                "description": "A relaxing yoga session",
                "date": date,
                "teacher_id": teacher_id
            }),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value["error"].is_string());
        assert_eq!(sessions.session_count(), 0);
    }

    #[tokio::test]
    async fn test_update_session_with_malformed_json() {
        let (app, sessions, teacher_id) = app().await;
        let session = sessions
            .create_session(&yoga_session(teacher_id, vec![]))
            .await
            .unwrap();

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/api/session/{}", session.id))
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_find_missing_session() {
        let (app, _, _) = app().await;

        let request = Request::builder()
            .uri("/api/session/12")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_leave_without_participating() {
        let (app, sessions, teacher_id) = app().await;
        let session = sessions
            .create_session(&yoga_session(teacher_id, vec![]))
            .await
            .unwrap();

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/session/{}/participate/3", session.id))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
