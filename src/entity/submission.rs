use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student's problem report. Created once by a student; only a teacher may
/// later set `feedback` and `revised_file_path`. Never deleted.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Identifier of the owning student. Informational linkage only, not a
    /// foreign key.
    pub student_identifier: String,

    pub desired_outcome: String,
    pub actual_outcome: String,
    pub problem: String,

    /// Content hash of the uploaded file. Set at creation.
    pub file_path: String,

    /// Teacher feedback. NULL until the feedback endpoint sets it.
    pub feedback: Option<String>,

    /// Content hash of the teacher's revised file, if one was uploaded.
    pub revised_file_path: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
