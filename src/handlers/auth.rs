use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{session, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{SESSION_COOKIE, SessionUser};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse,
    validate_login_request, validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, token};

/// Handle student registration. There is no teacher-registration endpoint;
/// teacher accounts are seeded at startup.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a student account",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Identifier already registered (IDENTIFIER_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(identifier = %payload.identifier))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let identifier = payload.identifier.trim().to_string();

    let password_hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        identifier: Set(identifier),
        password: Set(password_hash),
        role: Set(user::ROLE_STUDENT.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            AppError::IdentifierTaken
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(created))))
}

/// Handle student login.
#[utoipa::path(
    post,
    path = "/api/v1/auth/student-login",
    tag = "Auth",
    operation_id = "studentLogin",
    summary = "Log in as a student",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(identifier = %payload.identifier))]
pub async fn student_login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    login_with_role(&state, jar, payload, user::ROLE_STUDENT).await
}

/// Handle teacher login. Same body shape as student login; only the role
/// looked up differs.
#[utoipa::path(
    post,
    path = "/api/v1/auth/teacher-login",
    tag = "Auth",
    operation_id = "teacherLogin",
    summary = "Log in as a teacher",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(identifier = %payload.identifier))]
pub async fn teacher_login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    login_with_role(&state, jar, payload, user::ROLE_TEACHER).await
}

/// Shared login path: lookup is always by `(identifier, role)`, so a missing
/// account and a wrong password are indistinguishable to the caller.
async fn login_with_role(
    state: &AppState,
    jar: CookieJar,
    payload: LoginRequest,
    role: &str,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    validate_login_request(&payload)?;

    let identifier = payload.identifier.trim();

    let account = user::Entity::find()
        .filter(user::Column::Identifier.eq(identifier))
        .filter(user::Column::Role.eq(role))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let session_token = token::generate_session_token();
    let now = Utc::now();
    let ttl = Duration::minutes(state.config.auth.session_ttl_minutes);

    session::ActiveModel {
        token: Set(session_token.clone()),
        user_id: Set(account.id),
        identifier: Set(account.identifier.clone()),
        role: Set(account.role.clone()),
        created_at: Set(now),
        expires_at: Set(now + ttl),
    }
    .insert(&state.db)
    .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            identifier: account.identifier,
            role: account.role,
        }),
    ))
}

/// Invalidate the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Log out of the current session",
    responses(
        (status = 204, description = "Session invalidated; cookie cleared"),
        (status = 401, description = "No valid session (SESSION_MISSING, SESSION_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, session_user, jar), fields(identifier = %session_user.identifier))]
pub async fn logout(
    session_user: SessionUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    session::Entity::delete_by_id(session_user.token)
        .exec(&state.db)
        .await?;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    Ok((jar, StatusCode::NO_CONTENT))
}

/// Return the current authenticated user's info.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Get the current session's identity",
    responses(
        (status = 200, description = "Current identity", body = MeResponse),
        (status = 401, description = "No valid session (SESSION_MISSING, SESSION_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(session_user), fields(user_id = session_user.user_id))]
pub async fn me(session_user: SessionUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: session_user.user_id,
        identifier: session_user.identifier,
        role: session_user.role,
    })
}
