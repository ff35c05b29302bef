use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::contact;
use crate::error::{AppError, AppResult};
use crate::handlers::{non_empty, normalize_email, AppJson};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: &'static str,
    pub contact: contact::Model,
}

/// Store a message from the contact form
pub async fn submit_contact(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactRequest>,
) -> AppResult<(StatusCode, Json<ContactResponse>)> {
    let name = payload.name.trim();
    let email = normalize_email(&payload.email);
    let message = payload.message.trim();

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest(
            "Name, email, and message are required.".to_string(),
        ));
    }

    let contact = contact::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email),
        phone: Set(non_empty(payload.phone)),
        message: Set(message.to_string()),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await?;

    tracing::info!(contact_id = %contact.id, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            message: "Thank you for contacting us! We will get back to you soon.",
            contact,
        }),
    ))
}
