pub mod admin;
pub mod appointments;
pub mod auth;
pub mod contact;
pub mod health;
pub mod towing;

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` extractor whose rejections use the `{"error": ...}` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trim an optional form field, treating blank input as absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
