pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod storage;
pub mod utils;

use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Classdesk API",
        version = "1.0.0",
        description = "Classroom problem-report service: students submit problems with attached \
            files, teachers review them and attach feedback"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::student_login,
        handlers::auth::teacher_login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::submission::create_submission,
        handlers::submission::list_submissions,
        handlers::submission::apply_feedback,
        handlers::file::download_file,
    ),
    tags(
        (name = "Auth", description = "Registration, login, and sessions"),
        (name = "Submissions", description = "Problem reports and teacher feedback"),
        (name = "Files", description = "Uploaded file retrieval"),
    )
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let api = ApiDoc::openapi();

    routes::api_routes()
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
