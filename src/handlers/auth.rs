use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::handlers::{normalize_email, non_empty, AppJson};
use crate::utils::jwt::{issue_for, Claims};
use crate::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

impl From<user::Model> for UserInfo {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
        }
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

const EMAIL_TAKEN: &str = "Email already registered.";

/// Register a new customer account
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let name = payload.name.trim();
    let email = normalize_email(&payload.email);

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Name, email, and password are required.".to_string(),
        ));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_LEN
        )));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(state.db.as_ref())
        .await?;

    if existing.is_some() {
        tracing::info!(email = %email, "Registration rejected, email already in use");
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        phone: Set(non_empty(payload.phone)),
        role: Set(UserRole::Customer),
        ..Default::default()
    };

    // A concurrent registration can still win the race to the unique index
    let user = new_user
        .insert(state.db.as_ref())
        .await
        .map_err(|e| AppError::from_insert(e, EMAIL_TAKEN))?;
    tracing::info!(user_id = %user.id, "User registered");

    let token = issue_for(&user, &state.config)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            token,
            user: user.into(),
        }),
    ))
}

/// Look up a user by email and check the password
async fn authenticate(state: &AppState, payload: &LoginRequest) -> AppResult<user::Model> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password.".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password.".to_string()))?;

    Ok(user)
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = authenticate(&state, &payload).await?;
    let token = issue_for(&user, &state.config)?;
    tracing::info!(user_id = %user.id, "Login successful");

    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user: user.into(),
    }))
}

/// Login for the admin dashboard, rejects non-admin accounts
pub async fn admin_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = authenticate(&state, &payload).await?;
    if user.role != UserRole::Admin {
        tracing::warn!(user_id = %user.id, "Non-admin account attempted admin login");
        return Err(AppError::Forbidden("Invalid admin credentials".to_string()));
    }

    let token = issue_for(&user, &state.config)?;

    Ok(Json(AuthResponse {
        message: "Admin login successful",
        token,
        user: user.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserInfo,
}

/// Current user profile
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<MeResponse>> {
    let user = user::Entity::find_by_id(claims.sub)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    Ok(Json(MeResponse { user: user.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_verifies() {
        let hash = hash_password("hunter22").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();

        assert!(Argon2::default().verify_password(b"hunter22", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"hunter23", &parsed).is_err());
    }
}
