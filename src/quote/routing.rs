use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::utils::geo::Coordinate;

/// A driving route between two points as reported by a routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub distance_km: f64,
    pub duration_secs: f64,
    pub duration_text: String,
}

/// Every way a routed-distance lookup can fail. Callers recover from all of
/// them the same way, by falling back to the straight-line distance.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("routing provider returned status {0}")]
    Status(u16),
    #[error("no route found: {0}")]
    NoRoute(String),
    #[error("invalid routing response: {0}")]
    InvalidResponse(String),
    #[error("routing lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("routing is disabled")]
    Disabled,
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Resolve a driving route from `origin` to `destination`.
    async fn route(&self, origin: Coordinate, destination: Coordinate)
        -> Result<RouteLeg, RoutingError>;
}

/// Provider used when no routing endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRouting;

#[async_trait]
impl RoutingProvider for DisabledRouting {
    async fn route(&self, _origin: Coordinate, _destination: Coordinate) -> Result<RouteLeg, RoutingError> {
        Err(RoutingError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    // metres
    distance: f64,
    // seconds
    duration: f64,
}

/// Client for an OSRM-compatible `/route/v1/driving` endpoint.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build routing HTTP client: {}, using default", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        // OSRM expects lng,lat pairs
        format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url,
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude()
        )
    }
}

#[async_trait]
impl RoutingProvider for OsrmClient {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RouteLeg, RoutingError> {
        let url = self.route_url(origin, destination);
        tracing::debug!(url = %url, "Requesting driving route");

        let response = self
            .client
            .get(&url)
            .query(&[("overview", "false")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutingError::Status(status.as_u16()));
        }

        let body: OsrmResponse = response
            .json()
            .await
            .map_err(|e| RoutingError::InvalidResponse(e.to_string()))?;

        if body.code != "Ok" {
            return Err(RoutingError::NoRoute(
                body.message.unwrap_or(body.code),
            ));
        }

        let route = body
            .routes
            .first()
            .ok_or_else(|| RoutingError::NoRoute("empty route list".to_string()))?;

        if !route.distance.is_finite() || route.distance < 0.0 {
            return Err(RoutingError::InvalidResponse(format!(
                "distance {} is not a valid length",
                route.distance
            )));
        }
        if !route.duration.is_finite() || route.duration < 0.0 {
            return Err(RoutingError::InvalidResponse(format!(
                "duration {} is not a valid time",
                route.duration
            )));
        }

        Ok(RouteLeg {
            distance_km: route.distance / 1000.0,
            duration_secs: route.duration,
            duration_text: humanize_duration(route.duration),
        })
    }
}

/// Render a travel time the way map providers do: "25 mins",
/// "1 hour 5 mins", "2 days 3 hours".
pub fn humanize_duration(secs: f64) -> String {
    let total_minutes = ((secs / 60.0).round() as u64).max(1);
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes % (24 * 60)) / 60;
    let minutes = total_minutes % 60;

    if days > 0 {
        if hours > 0 {
            format!("{} {}", plural(days, "day"), plural(hours, "hour"))
        } else {
            plural(days, "day")
        }
    } else if hours > 0 {
        if minutes > 0 {
            format!("{} {}", plural(hours, "hour"), plural(minutes, "min"))
        } else {
            plural(hours, "hour")
        }
    } else {
        plural(minutes, "min")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_duration() {
        assert_eq!(humanize_duration(0.0), "1 min");
        assert_eq!(humanize_duration(59.0), "1 min");
        assert_eq!(humanize_duration(25.0 * 60.0), "25 mins");
        assert_eq!(humanize_duration(3600.0), "1 hour");
        assert_eq!(humanize_duration(3900.0), "1 hour 5 mins");
        assert_eq!(humanize_duration(2.0 * 3600.0 + 60.0), "2 hours 1 min");
        assert_eq!(humanize_duration(26.0 * 3600.0), "1 day 2 hours");
        assert_eq!(humanize_duration(48.0 * 3600.0 + 120.0), "2 days");
    }

    #[test]
    fn test_route_url_uses_lng_lat_order() {
        let client = OsrmClient::new("http://osrm.local/", Duration::from_secs(1));
        let origin = Coordinate::new(43.7, -79.4).unwrap();
        let shop = Coordinate::new(43.6532, -79.3832).unwrap();

        assert_eq!(
            client.route_url(origin, shop),
            "http://osrm.local/route/v1/driving/-79.4,43.7;-79.3832,43.6532"
        );
    }

    #[tokio::test]
    async fn test_disabled_routing_always_fails() {
        let point = Coordinate::new(0.0, 0.0).unwrap();
        let result = DisabledRouting.route(point, point).await;
        assert!(matches!(result, Err(RoutingError::Disabled)));
    }
}
