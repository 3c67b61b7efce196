use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The role assigned to newly registered users. Teacher accounts are only
/// ever created by startup seeding.
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_TEACHER: &str = "teacher";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login id (student number or teacher id). Unique per role, not
    /// globally: the same identifier may exist once as a student and once
    /// as a teacher. The composite unique index is ensured at startup.
    pub identifier: String,

    /// Argon2id hash of the password. The plaintext is never stored.
    pub password: String,

    /// One of `ROLE_STUDENT`, `ROLE_TEACHER`. Fixed at creation.
    pub role: String,

    #[sea_orm(has_many)]
    pub sessions: HasMany<super::session::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
