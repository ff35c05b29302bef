use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::quote::pricing::{calculate_cost, clamp_distance, CostBreakdown, PricingPolicy};
use crate::quote::routing::{RouteLeg, RoutingError, RoutingProvider};
use crate::quote::ShopLocation;
use crate::utils::geo::{great_circle_distance_km, Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    Routed,
    StraightLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteResult {
    pub distance_km: f64,
    /// Only set for routed distances.
    pub duration_text: Option<String>,
    pub source: DistanceSource,
    pub cost: CostBreakdown,
}

impl QuoteResult {
    /// Distance formatted for booking records, one decimal.
    pub fn distance_text(&self) -> String {
        format!("{:.1}", self.distance_km)
    }

    /// Cost formatted for booking records, two decimals.
    pub fn cost_text(&self) -> String {
        format!("{:.2}", self.cost.cost)
    }
}

/// Quotes towing jobs to the shop. Shared across requests; holds no
/// per-request state.
pub struct QuoteEstimator {
    router: Arc<dyn RoutingProvider>,
    shop: ShopLocation,
    pricing: PricingPolicy,
    routing_timeout: Duration,
}

impl QuoteEstimator {
    pub fn new(
        router: Arc<dyn RoutingProvider>,
        shop: ShopLocation,
        pricing: PricingPolicy,
        routing_timeout: Duration,
    ) -> Self {
        Self {
            router,
            shop,
            pricing,
            routing_timeout,
        }
    }

    pub fn shop(&self) -> &ShopLocation {
        &self.shop
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Quote a tow from `pickup` to the shop.
    ///
    /// Uses the driving distance when the routing provider answers in time,
    /// otherwise the great-circle distance. Never fails.
    pub async fn estimate(&self, pickup: Coordinate) -> QuoteResult {
        let (distance_km, duration_text, source) = match self.resolve_route(pickup).await {
            Ok(leg) => (leg.distance_km, Some(leg.duration_text), DistanceSource::Routed),
            Err(err) => {
                let distance = great_circle_distance_km(pickup, self.shop.location);
                tracing::warn!(
                    error = %err,
                    pickup_lat = pickup.latitude(),
                    pickup_lng = pickup.longitude(),
                    distance_km = distance,
                    "Routing unavailable, using straight-line distance"
                );
                (distance, None, DistanceSource::StraightLine)
            }
        };

        let distance_km = clamp_distance(distance_km);
        let cost = calculate_cost(distance_km, &self.pricing);

        tracing::debug!(
            distance_km,
            cost = cost.cost,
            source = ?source,
            "Towing quote computed"
        );

        QuoteResult {
            distance_km,
            duration_text,
            source,
            cost,
        }
    }

    async fn resolve_route(&self, pickup: Coordinate) -> Result<RouteLeg, RoutingError> {
        tokio::time::timeout(
            self.routing_timeout,
            self.router.route(pickup, self.shop.location),
        )
        .await
        .map_err(|_| RoutingError::Timeout(self.routing_timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedRoute(f64);

    #[async_trait]
    impl RoutingProvider for FixedRoute {
        async fn route(&self, _: Coordinate, _: Coordinate) -> Result<RouteLeg, RoutingError> {
            Ok(RouteLeg {
                distance_km: self.0,
                duration_secs: 1500.0,
                duration_text: "25 mins".to_string(),
            })
        }
    }

    struct FailingRoute;

    #[async_trait]
    impl RoutingProvider for FailingRoute {
        async fn route(&self, _: Coordinate, _: Coordinate) -> Result<RouteLeg, RoutingError> {
            Err(RoutingError::NoRoute("unreachable".to_string()))
        }
    }

    struct SlowRoute;

    #[async_trait]
    impl RoutingProvider for SlowRoute {
        async fn route(&self, _: Coordinate, _: Coordinate) -> Result<RouteLeg, RoutingError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(RouteLeg {
                distance_km: 1.0,
                duration_secs: 60.0,
                duration_text: "1 min".to_string(),
            })
        }
    }

    fn estimator(router: Arc<dyn RoutingProvider>, timeout: Duration) -> QuoteEstimator {
        QuoteEstimator::new(router, ShopLocation::default(), PricingPolicy::default(), timeout)
    }

    fn pickup() -> Coordinate {
        Coordinate::new(43.7615, -79.4111).unwrap()
    }

    #[tokio::test]
    async fn test_routed_distance_preferred() {
        let quote = estimator(Arc::new(FixedRoute(25.0)), Duration::from_secs(5))
            .estimate(pickup())
            .await;

        assert_eq!(quote.source, DistanceSource::Routed);
        assert_eq!(quote.distance_km, 25.0);
        assert_eq!(quote.duration_text.as_deref(), Some("25 mins"));
        assert_eq!(quote.cost.extra_km, 15.0);
        assert_eq!(quote.cost.extra_cost, 225.0);
        assert_eq!(quote.cost_text(), "325.00");
        assert_eq!(quote.distance_text(), "25.0");
    }

    #[tokio::test]
    async fn test_routing_failure_falls_back_to_great_circle() {
        let quote = estimator(Arc::new(FailingRoute), Duration::from_secs(5))
            .estimate(pickup())
            .await;

        let expected = great_circle_distance_km(pickup(), ShopLocation::default().location);
        assert_eq!(quote.source, DistanceSource::StraightLine);
        assert!(quote.duration_text.is_none());
        assert!((quote.distance_km - expected).abs() < 1e-6);
        assert_eq!(quote.cost, calculate_cost(expected, &PricingPolicy::default()));
    }

    #[tokio::test]
    async fn test_routing_timeout_falls_back() {
        let quote = estimator(Arc::new(SlowRoute), Duration::from_millis(50))
            .estimate(pickup())
            .await;

        assert_eq!(quote.source, DistanceSource::StraightLine);
        assert!(quote.duration_text.is_none());
    }

    #[tokio::test]
    async fn test_pickup_at_shop_costs_base_rate() {
        let shop = ShopLocation::default().location;
        let quote = estimator(Arc::new(FailingRoute), Duration::from_secs(5))
            .estimate(shop)
            .await;

        assert_eq!(quote.distance_km, 0.0);
        assert_eq!(quote.cost_text(), "100.00");
    }

    #[tokio::test]
    async fn test_negative_routed_distance_clamped() {
        let quote = estimator(Arc::new(FixedRoute(-3.0)), Duration::from_secs(5))
            .estimate(pickup())
            .await;

        assert_eq!(quote.distance_km, 0.0);
        assert_eq!(quote.cost.cost, 100.0);
    }
}
