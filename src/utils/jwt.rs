use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,       // user id
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Issue a session token for `user` using the configured secret and lifetime.
pub fn issue_for(user: &user::Model, config: &Config) -> AppResult<String> {
    create_token(
        user.id,
        &user.email,
        user.role.clone(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )
}

pub fn create_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized("Invalid or expired token".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip_keeps_identity() {
        let id = Uuid::new_v4();
        let token = create_token(id, "driver@example.com", UserRole::Customer, "s3cret", 1).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "driver@example.com");
        assert!(!claims.is_admin());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(Uuid::new_v4(), "a@b.c", UserRole::Admin, "one", 1).unwrap();
        assert!(matches!(verify_token(&token, "two"), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let token = create_token(Uuid::new_v4(), "a@b.c", UserRole::Admin, "key", -2).unwrap();
        assert!(verify_token(&token, "key").is_err());
    }
}
