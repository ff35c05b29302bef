use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::entities::appointment::{self, AppointmentStatus};
use crate::error::{AppError, AppResult};
use crate::handlers::{non_empty, AppJson};
use crate::handlers::towing::QuoteResponse;
use crate::quote::QuoteResult;
use crate::utils::geo::Coordinate;
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

pub const TOWING_SERVICE: &str = "Towing Service";

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
    pub service: Option<String>,
    #[serde(default, deserialize_with = "deserialize_preferred_date")]
    pub preferred_date: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub towing: Option<TowingDetails>,
    /// Honeypot, left blank by real visitors
    pub website: Option<String>,
}

/// Booking forms send either a full RFC 3339 timestamp or a plain
/// `YYYY-MM-DD` date input; a bare date means midnight UTC.
fn parse_preferred_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

fn deserialize_preferred_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = non_empty(Option::<String>::deserialize(deserializer)?) else {
        return Ok(None);
    };

    parse_preferred_date(&raw).map(Some).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid preferred_date `{}`, expected YYYY-MM-DD or an RFC 3339 timestamp",
            raw
        ))
    })
}

#[derive(Debug, Deserialize)]
pub struct TowingDetails {
    #[serde(default)]
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub vehicle_type: Option<String>,
    pub issue: Option<String>,
    #[serde(default)]
    pub urgent: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateAppointmentResponse {
    pub message: &'static str,
    pub appointment: appointment::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteResponse>,
}

/// Message stored with a towing request, in the format the shop's staff
/// already read in their inbox.
pub fn towing_message(
    details: &TowingDetails,
    quote: &QuoteResult,
    notes: Option<&str>,
) -> String {
    let mut message = format!(
        "Towing Request:\n\
         Location: {}\n\
         Coordinates: {}, {}\n\
         Distance: {} km\n\
         Vehicle: {}\n\
         Estimated Cost: ${}\n\
         Issue: {}\n\
         Urgent: {}",
        details.location.trim(),
        details.latitude,
        details.longitude,
        quote.distance_text(),
        details.vehicle_type.as_deref().unwrap_or("Not specified"),
        quote.cost_text(),
        details.issue.as_deref().unwrap_or("Not specified"),
        if details.urgent { "YES" } else { "No" },
    );

    if let Some(notes) = notes {
        message.push_str("\nNotes: ");
        message.push_str(notes);
    }

    message
}

/// Submit an appointment request. Public; a bearer token, when sent,
/// links the appointment to the account.
pub async fn create_appointment(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    AppJson(payload): AppJson<CreateAppointmentRequest>,
) -> AppResult<(StatusCode, Json<CreateAppointmentResponse>)> {
    if non_empty(payload.website.clone()).is_some() {
        tracing::warn!("Appointment rejected by honeypot");
        return Err(AppError::BadRequest("Submission rejected.".to_string()));
    }

    let user_id = match auth {
        Some(TypedHeader(auth)) => Some(verify_token(auth.token(), &state.config.jwt_secret)?.sub),
        None => None,
    };

    let name = payload.name.trim().to_string();
    let phone = payload.phone.trim().to_string();
    let service = match (non_empty(payload.service), &payload.towing) {
        (Some(service), _) => service,
        (None, Some(_)) => TOWING_SERVICE.to_string(),
        (None, None) => String::new(),
    };

    if name.is_empty() || phone.is_empty() || service.is_empty() {
        return Err(AppError::BadRequest(
            "Name, phone, and service are required.".to_string(),
        ));
    }

    let notes = non_empty(payload.message);
    let mut new_appointment = appointment::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(name),
        email: Set(non_empty(payload.email).map(|e| e.to_lowercase())),
        phone: Set(phone),
        service: Set(service),
        preferred_date: Set(payload.preferred_date.map(Into::into)),
        message: Set(notes.clone()),
        status: Set(AppointmentStatus::Pending),
        pickup_location: Set(None),
        pickup_lat: Set(None),
        pickup_lng: Set(None),
        vehicle_type: Set(None),
        urgent: Set(false),
        distance_km: Set(None),
        estimated_cost: Set(None),
        ..Default::default()
    };

    let mut quote_response = None;
    if let Some(details) = &payload.towing {
        if details.location.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Please enter or select a vehicle location.".to_string(),
            ));
        }

        // Price is always recomputed here; client-side estimates are display only
        let pickup = Coordinate::new(details.latitude, details.longitude)?;
        let quote = state.estimator.estimate(pickup).await;

        new_appointment.message = Set(Some(towing_message(details, &quote, notes.as_deref())));
        new_appointment.pickup_location = Set(Some(details.location.trim().to_string()));
        new_appointment.pickup_lat = Set(Some(pickup.latitude()));
        new_appointment.pickup_lng = Set(Some(pickup.longitude()));
        new_appointment.vehicle_type = Set(non_empty(details.vehicle_type.clone()));
        new_appointment.urgent = Set(details.urgent);
        new_appointment.distance_km = Set(Some(quote.distance_text()));
        new_appointment.estimated_cost = Set(Some(quote.cost_text()));
        quote_response = Some(QuoteResponse::from(quote));
    }

    let appointment = new_appointment.insert(state.db.as_ref()).await?;
    tracing::info!(
        appointment_id = %appointment.id,
        service = %appointment.service,
        towing = quote_response.is_some(),
        "Appointment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateAppointmentResponse {
            message: "Appointment request submitted successfully!",
            appointment,
            quote: quote_response,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<appointment::Model>,
}

/// Appointments submitted by the logged-in user, newest first
pub async fn my_appointments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<AppointmentListResponse>> {
    let appointments = appointment::Entity::find()
        .filter(appointment::Column::UserId.eq(claims.sub))
        .order_by_desc(appointment::Column::CreatedAt)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(AppointmentListResponse { appointments }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{calculate_cost, DistanceSource, PricingPolicy};

    #[test]
    fn test_towing_message_format() {
        let details = TowingDetails {
            location: " 100 Queen St W, Toronto ".to_string(),
            latitude: 43.6534,
            longitude: -79.3841,
            vehicle_type: Some("SUV".to_string()),
            issue: None,
            urgent: true,
        };
        let quote = QuoteResult {
            distance_km: 24.96,
            duration_text: None,
            source: DistanceSource::StraightLine,
            cost: calculate_cost(24.96, &PricingPolicy::default()),
        };

        let message = towing_message(&details, &quote, Some("Blue car"));

        assert_eq!(
            message,
            "Towing Request:\n\
             Location: 100 Queen St W, Toronto\n\
             Coordinates: 43.6534, -79.3841\n\
             Distance: 25.0 km\n\
             Vehicle: SUV\n\
             Estimated Cost: $324.40\n\
             Issue: Not specified\n\
             Urgent: YES\n\
             Notes: Blue car"
        );
    }

    #[test]
    fn test_preferred_date_formats() {
        let date_only = parse_preferred_date("2026-10-20").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2026-10-20T00:00:00+00:00");

        let with_offset = parse_preferred_date("2026-10-20T09:30:00-04:00").unwrap();
        assert_eq!(with_offset.to_rfc3339(), "2026-10-20T13:30:00+00:00");

        assert!(parse_preferred_date("next tuesday").is_none());
        assert!(parse_preferred_date("2026-13-40").is_none());
    }

    #[test]
    fn test_blank_preferred_date_is_absent() {
        let request: CreateAppointmentRequest = serde_json::from_str(
            r#"{"name": "Jane", "phone": "555", "service": "Oil Change", "preferred_date": " "}"#,
        )
        .unwrap();
        assert!(request.preferred_date.is_none());

        let request: CreateAppointmentRequest =
            serde_json::from_str(r#"{"name": "Jane", "phone": "555"}"#).unwrap();
        assert!(request.preferred_date.is_none());
    }
}
