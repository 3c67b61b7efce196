use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for student registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Login id (1-32 chars, alphanumeric and underscores).
    #[schema(example = "s2026_041")]
    pub identifier: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let identifier = payload.identifier.trim();
    if identifier.is_empty() || identifier.chars().count() > 32 {
        return Err(AppError::Validation(
            "Identifier must be 1-32 characters".into(),
        ));
    }
    if !identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Identifier must contain only letters, digits, and underscores".into(),
        ));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for both login endpoints. Which role is looked up is decided
/// by the endpoint, never by the body.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Login id of the account.
    #[schema(example = "s2026_041")]
    pub identifier: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.identifier.trim().is_empty() {
        return Err(AppError::Validation("Identifier must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    /// ID of the newly created user.
    #[schema(example = 42)]
    pub id: i32,
    /// Identifier of the newly created user.
    #[schema(example = "s2026_041")]
    pub identifier: String,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            identifier: user.identifier,
        }
    }
}

/// Successful login response. The session itself travels in an HttpOnly
/// cookie, not in the body.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Authenticated user's identifier.
    #[schema(example = "s2026_041")]
    pub identifier: String,
    /// Authenticated user's role.
    #[schema(example = "student")]
    pub role: String,
}

/// Current authenticated user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    /// User ID.
    #[schema(example = 42)]
    pub id: i32,
    /// Identifier.
    #[schema(example = "s2026_041")]
    pub identifier: String,
    /// Role.
    #[schema(example = "student")]
    pub role: String,
}
