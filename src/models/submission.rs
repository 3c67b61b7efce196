use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::submission;

/// A submission as returned to clients.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = 7)]
    pub id: i32,
    /// Identifier of the student who submitted.
    #[schema(example = "s2026_041")]
    pub student_identifier: String,
    pub desired_outcome: String,
    pub actual_outcome: String,
    pub problem: String,
    /// Content hash of the uploaded file; retrievable via `/api/v1/files/{hash}`.
    pub file_path: String,
    /// Teacher feedback, absent until set.
    pub feedback: Option<String>,
    /// Content hash of the teacher's revised file, absent until uploaded.
    pub revised_file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<submission::Model> for SubmissionResponse {
    fn from(model: submission::Model) -> Self {
        Self {
            id: model.id,
            student_identifier: model.student_identifier,
            desired_outcome: model.desired_outcome,
            actual_outcome: model.actual_outcome,
            problem: model.problem,
            file_path: model.file_path,
            feedback: model.feedback,
            revised_file_path: model.revised_file_path,
            created_at: model.created_at,
        }
    }
}
