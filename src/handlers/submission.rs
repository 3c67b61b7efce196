use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sea_orm::*;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{submission, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::SessionUser;
use crate::models::submission::SubmissionResponse;
use crate::state::AppState;
use crate::storage::{BoxReader, ContentHash};
use crate::utils::filename::validate_upload_filename;

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(32 * 1024 * 1024) // 32 MB; the blob store enforces the configured per-file limit
}

/// Create a submission. Students only.
#[utoipa::path(
    post,
    path = "/api/v1/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Submit a problem report with an attached file",
    description = "Multipart form with text fields `desired_outcome`, `actual_outcome`, `problem` \
        and a required `file` field. Missing text fields are stored as empty strings.",
    request_body(content_type = "multipart/form-data", description = "Problem report plus file upload"),
    responses(
        (status = 201, description = "Submission created", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "No student session (SESSION_MISSING, SESSION_INVALID, ROLE_DENIED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, session_user, multipart), fields(identifier = %session_user.identifier))]
pub async fn create_submission(
    session_user: SessionUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    session_user.require_role(user::ROLE_STUDENT)?;

    let mut desired_outcome = String::new();
    let mut actual_outcome = String::new();
    let mut problem = String::new();
    let mut file_hash: Option<ContentHash> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("desired_outcome") => desired_outcome = read_text_field(field).await?,
            Some("actual_outcome") => actual_outcome = read_text_field(field).await?,
            Some("problem") => problem = read_text_field(field).await?,
            Some("file") => {
                if let Some(name) = field.file_name() {
                    validate_upload_filename(name)
                        .map_err(|e| AppError::Validation(e.message().into()))?;
                }
                file_hash = Some(store_field(field, &state).await?);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let hash = file_hash.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let new_submission = submission::ActiveModel {
        student_identifier: Set(session_user.identifier.clone()),
        desired_outcome: Set(desired_outcome),
        actual_outcome: Set(actual_outcome),
        problem: Set(problem),
        file_path: Set(hash.to_hex()),
        feedback: Set(None),
        revised_file_path: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = new_submission.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::from(created)),
    ))
}

/// List every submission. Teachers only.
#[utoipa::path(
    get,
    path = "/api/v1/submissions",
    tag = "Submissions",
    operation_id = "listSubmissions",
    summary = "List all submissions",
    description = "Returns every submission in insertion order. No pagination.",
    responses(
        (status = 200, description = "All submissions", body = Vec<SubmissionResponse>),
        (status = 401, description = "No teacher session (SESSION_MISSING, SESSION_INVALID, ROLE_DENIED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, session_user), fields(identifier = %session_user.identifier))]
pub async fn list_submissions(
    session_user: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    session_user.require_role(user::ROLE_TEACHER)?;

    let records = submission::Entity::find()
        .order_by_asc(submission::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        records.into_iter().map(SubmissionResponse::from).collect(),
    ))
}

/// Attach feedback (and optionally a revised file) to a submission.
/// Teachers only.
#[utoipa::path(
    post,
    path = "/api/v1/submissions/{id}/feedback",
    tag = "Submissions",
    operation_id = "applyFeedback",
    summary = "Attach feedback to a submission",
    description = "Multipart form with a required `feedback` text field and an optional \
        `revised_file` upload. Without a new upload, any previously set revised file is kept.",
    params(("id" = i32, Path, description = "Submission ID")),
    request_body(content_type = "multipart/form-data", description = "Feedback text plus optional revised file"),
    responses(
        (status = 200, description = "Submission updated", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "No teacher session (SESSION_MISSING, SESSION_INVALID, ROLE_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, session_user, multipart), fields(identifier = %session_user.identifier, id))]
pub async fn apply_feedback(
    session_user: SessionUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<SubmissionResponse>, AppError> {
    session_user.require_role(user::ROLE_TEACHER)?;

    let record = submission::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {id} not found")))?;

    let mut feedback: Option<String> = None;
    let mut revised_hash: Option<ContentHash> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("feedback") => feedback = Some(read_text_field(field).await?),
            Some("revised_file") => {
                if let Some(name) = field.file_name() {
                    validate_upload_filename(name)
                        .map_err(|e| AppError::Validation(e.message().into()))?;
                }
                revised_hash = Some(store_field(field, &state).await?);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let feedback =
        feedback.ok_or_else(|| AppError::Validation("Missing 'feedback' field".into()))?;

    let mut active: submission::ActiveModel = record.into();
    active.feedback = Set(Some(feedback));
    // Without a new upload the existing revised file, if any, stays in place.
    if let Some(hash) = revised_hash {
        active.revised_file_path = Set(Some(hash.to_hex()));
    }

    let updated = active.update(&state.db).await?;

    Ok(Json(SubmissionResponse::from(updated)))
}

/// Read a multipart text field, failing with a validation error.
async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or("field").to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

/// Stream a multipart file field into the blob store via a temp file.
async fn store_field(
    mut field: axum::extract::multipart::Field<'_>,
    state: &AppState,
) -> Result<ContentHash, AppError> {
    let max_size = state.config.storage.max_upload_size;
    let temp_path = std::env::temp_dir().join(format!("classdesk-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        let hash = state.blob_store.put_stream(reader).await?;

        Ok(hash)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
