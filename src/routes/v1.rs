use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/submissions", submission_routes())
        .nest("/files", file_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/student-login", post(handlers::auth::student_login))
        .route("/teacher-login", post(handlers::auth::teacher_login))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
}

fn submission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::submission::list_submissions)
                .post(handlers::submission::create_submission),
        )
        .route(
            "/{id}/feedback",
            post(handlers::submission::apply_feedback),
        )
        .layer(handlers::submission::upload_body_limit())
}

fn file_routes() -> Router<AppState> {
    Router::new().route("/{hash}", get(handlers::file::download_file))
}
