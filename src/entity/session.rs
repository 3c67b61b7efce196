use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A server-side login session. Persisted so that a process restart does not
/// log anyone out.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session")]
pub struct Model {
    /// 64-char hex token, generated from 32 random bytes. Carried by the
    /// session cookie.
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    /// Denormalized from the user so handlers can authorize without a JOIN.
    pub identifier: String,
    pub role: String,

    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
