use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Type alias for IP-based governor layers
pub type IpGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

fn ip_governor(replenish_ms: u64, burst: u32) -> IpGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(burst)
            .finish()
            .expect("rate limit quota must be non-zero"),
    );

    GovernorLayer::new(config)
}

/// Global rate limiting per IP address
/// - 1000 requests per minute (one token every 60ms)
/// - Applied to the whole app, before authentication
pub fn create_global_governor() -> IpGovernorLayer {
    ip_governor(60, 1000)
}

/// Public form submissions (register, login, appointments, contact)
/// - 20 requests per minute (one token every 3s), burst of 20
pub fn create_form_governor() -> IpGovernorLayer {
    ip_governor(3000, 20)
}

/// Shop info and quotes, re-requested each time the pickup pin moves
/// - 120 requests per minute (one token every 500ms), burst of 60
/// - Separate bucket so quoting never starves the booking submit
pub fn create_quote_governor() -> IpGovernorLayer {
    ip_governor(500, 60)
}

/// Middleware to log rate limiting and request details
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(
        client_ip = %addr.ip(),
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request rejected by rate limiter"
        );
    } else if status.is_server_error() {
        tracing::error!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request rejected"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request completed"
        );
    }

    response
}
