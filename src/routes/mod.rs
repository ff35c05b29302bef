use axum::{
    http::{StatusCode, Uri},
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tower::limit::ConcurrencyLimitLayer;

use crate::handlers::{admin, appointments, auth, contact, health, towing};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::rate_limit::{create_form_governor, create_quote_governor, log_request};
use crate::AppState;

/// Concurrent quotes in flight, each may hold an outbound routing request
const MAX_CONCURRENT_QUOTES: usize = 64;

pub fn create_router(state: AppState) -> Router {
    // IP-based limit shared by every public form endpoint
    let form_governor = create_form_governor();

    // Public auth routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/admin-login", post(auth::admin_login))
        .layer(form_governor.clone())
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    // Towing quote and shop info (public)
    let towing_routes = Router::new()
        .route("/shop", get(towing::shop_info))
        .route("/quote", post(towing::quote))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_QUOTES))
        .layer(create_quote_governor());

    // Appointment submission is public, listing your own requires a login
    let appointment_routes = Router::new()
        .route("/", post(appointments::create_appointment))
        .layer(form_governor.clone())
        .merge(
            Router::new()
                .route("/my", get(appointments::my_appointments))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let contact_routes = Router::new()
        .route("/", post(contact::submit_contact))
        .layer(form_governor);

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/appointments", get(admin::list_appointments))
        .route(
            "/appointments/{id}",
            patch(admin::update_appointment).delete(admin::delete_appointment),
        )
        .route("/contacts", get(admin::list_contacts))
        .route("/contacts/{id}", delete(admin::delete_contact))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/towing", towing_routes)
        .nest("/api/appointments", appointment_routes)
        .nest("/api/contact", contact_routes)
        .nest("/api/admin", admin_routes)
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "path": uri.path(),
            "message": "The requested resource was not found"
        })),
    )
}
