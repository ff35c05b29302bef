use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::appointment::{self, AppointmentStatus};
use crate::entities::user::{self, UserRole};
use crate::entities::contact;
use crate::error::{AppError, AppResult};
use crate::handlers::AppJson;
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ User Management ============

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

/// List all users, newest first (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UserListResponse>> {
    let users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(state.db.as_ref())
        .await?;

    let users: Vec<UserResponse> = users
        .into_iter()
        .map(|u| UserResponse {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            role: u.role,
            created_at: u.created_at.with_timezone(&Utc),
        })
        .collect();

    tracing::debug!(count = users.len(), "Fetched users");
    Ok(Json(UserListResponse { users }))
}

/// Delete a user account (admin). Their appointments are kept, unlinked.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if id == claims.sub {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let result = user::Entity::delete_by_id(id).exec(state.db.as_ref()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User not found.".to_string()));
    }

    tracing::info!(user_id = %id, "User deleted");
    Ok(Json(serde_json::json!({ "message": "User deleted successfully" })))
}

// ============ Appointment Management ============

#[derive(Debug, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<appointment::Model>,
}

/// List all appointments, newest first (admin)
pub async fn list_appointments(
    State(state): State<AppState>,
) -> AppResult<Json<AppointmentListResponse>> {
    let appointments = appointment::Entity::find()
        .order_by_desc(appointment::Column::CreatedAt)
        .all(state.db.as_ref())
        .await?;

    tracing::debug!(count = appointments.len(), "Fetched appointments");
    Ok(Json(AppointmentListResponse { appointments }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub message: &'static str,
    pub appointment: appointment::Model,
}

/// Move an appointment to a new status (admin)
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateAppointmentRequest>,
) -> AppResult<Json<AppointmentResponse>> {
    let existing = appointment::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))?;

    let previous = existing.status;
    let mut active: appointment::ActiveModel = existing.into();
    active.status = Set(payload.status);
    let appointment = active.update(state.db.as_ref()).await?;

    tracing::info!(
        appointment_id = %id,
        from = ?previous,
        to = ?appointment.status,
        "Appointment status updated"
    );

    Ok(Json(AppointmentResponse {
        message: "Appointment updated",
        appointment,
    }))
}

/// Delete an appointment (admin)
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = appointment::Entity::delete_by_id(id).exec(state.db.as_ref()).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Appointment not found.".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Appointment deleted successfully" })))
}

// ============ Contact Messages ============

#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub contacts: Vec<contact::Model>,
}

/// List all contact form submissions, newest first (admin)
pub async fn list_contacts(State(state): State<AppState>) -> AppResult<Json<ContactListResponse>> {
    let contacts = contact::Entity::find()
        .order_by_desc(contact::Column::CreatedAt)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(ContactListResponse { contacts }))
}

/// Delete a contact message (admin)
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = contact::Entity::delete_by_id(id).exec(state.db.as_ref()).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Contact not found.".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Contact deleted successfully" })))
}
