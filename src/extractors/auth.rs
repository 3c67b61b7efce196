use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, ModelTrait};

use crate::entity::session;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "classdesk_session";

/// Authenticated identity resolved from the session cookie.
///
/// Add this as a handler parameter to require a logged-in session.
/// Role checks happen via `require_role()` in the handler body.
pub struct SessionUser {
    pub user_id: i32,
    pub identifier: String,
    pub role: String,
    /// Token of the resolved session, kept so logout can delete the row.
    pub token: String,
}

impl SessionUser {
    /// Returns `Ok(())` if the session's role matches, `Err(RoleDenied)` otherwise.
    pub fn require_role(&self, role: &str) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::RoleDenied)
        }
    }
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(AppError::SessionMissing)?;

        let record = session::Entity::find_by_id(token.clone())
            .one(&state.db)
            .await?
            .ok_or(AppError::SessionInvalid)?;

        let now = Utc::now();
        if record.expires_at <= now {
            // Lazy cleanup: an expired session is deleted when presented.
            record.delete(&state.db).await?;
            return Err(AppError::SessionInvalid);
        }

        let user_id = record.user_id;
        let identifier = record.identifier.clone();
        let role = record.role.clone();

        // Sliding expiry: refresh only once the session is past half its
        // lifetime.
        let ttl = Duration::minutes(state.config.auth.session_ttl_minutes);
        if record.expires_at - now < ttl / 2 {
            let mut active: session::ActiveModel = record.into();
            active.expires_at = Set(now + ttl);
            active.update(&state.db).await?;
        }

        Ok(SessionUser {
            user_id,
            identifier,
            role,
            token,
        })
    }
}
