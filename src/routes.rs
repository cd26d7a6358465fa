use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth, session, shared::AppState, teacher, user};

/// Assembles the application: public auth routes, then every other `/api` route
/// behind the bearer-token middleware.
pub fn create_router(app_state: AppState) -> Router {
    let public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected = Router::new()
        .route(
            "/api/session",
            get(session::list_sessions).post(session::create_session),
        )
        .route(
            "/api/session/:id",
            get(session::find_session_by_id)
                .put(session::update_session)
                .delete(session::delete_session),
        )
        .route(
            "/api/session/:id/participate/:user_id",
            post(session::participate).delete(session::no_longer_participate),
        )
        .route("/api/teacher", get(teacher::list_teachers))
        .route("/api/teacher/:id", get(teacher::find_teacher_by_id))
        .route(
            "/api/user/:id",
            get(user::find_user_by_id).delete(user::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::jwt_auth,
        ));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
