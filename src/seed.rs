use chrono::Utc;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AuthConfig;
use crate::entity::{session, user};
use crate::utils::hash;

/// Create the configured teacher account if it does not exist yet.
///
/// Registration only ever creates students; this is the sole path that
/// creates a teacher.
pub async fn seed_teacher(db: &DatabaseConnection, auth: &AuthConfig) -> Result<(), DbErr> {
    let (Some(identifier), Some(password)) = (&auth.teacher_identifier, &auth.teacher_password)
    else {
        return Ok(());
    };

    let existing = user::Entity::find()
        .filter(user::Column::Identifier.eq(identifier))
        .filter(user::Column::Role.eq(user::ROLE_TEACHER))
        .one(db)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let password_hash = hash::hash_password(password)
        .map_err(|e| DbErr::Custom(format!("Failed to hash teacher password: {e}")))?;

    let model = user::ActiveModel {
        identifier: Set(identifier.clone()),
        password: Set(password_hash),
        role: Set(user::ROLE_TEACHER.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match model.insert(db).await {
        Ok(_) => {
            info!("Seeded teacher account '{}'", identifier);
            Ok(())
        }
        // A concurrently started instance may have seeded it first.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite unique indexes, so the
/// `(identifier, role)` uniqueness that registration conflict detection
/// relies on is created manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_user_identifier_role")
        .table(user::Entity)
        .col(user::Column::Identifier)
        .col(user::Column::Role)
        .to_string(PostgresQueryBuilder);

    db.execute_unprepared(&stmt).await?;
    info!("Ensured unique index idx_user_identifier_role exists");

    // Supports the startup purge of expired sessions.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_session_expires")
        .table(session::Entity)
        .col(session::Column::ExpiresAt)
        .to_string(PostgresQueryBuilder);

    let result = db.execute_unprepared(&stmt).await;
    match result {
        Ok(_) => {
            info!("Ensured index idx_session_expires exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_session_expires: {}", e);
        }
    }

    Ok(())
}

/// Delete sessions that expired before now. Run once at startup; expired
/// sessions presented later are deleted lazily on resolution.
pub async fn purge_expired_sessions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let result = session::Entity::delete_many()
        .filter(session::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!("Purged {} expired sessions", result.rows_affected);
    }

    Ok(())
}
