//! Towing quotes: routed or straight-line distance to the shop, priced with
//! a tiered per-kilometre policy.

pub mod estimator;
pub mod pricing;
pub mod routing;

use serde::Serialize;

use crate::utils::geo::Coordinate;

pub use estimator::{DistanceSource, QuoteEstimator, QuoteResult};
pub use pricing::{calculate_cost, CostBreakdown, PricingPolicy};
pub use routing::{DisabledRouting, OsrmClient, RouteLeg, RoutingError, RoutingProvider};

/// Where towed vehicles are delivered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopLocation {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub location: Coordinate,
}

impl Default for ShopLocation {
    fn default() -> Self {
        Self {
            name: "Auto Shop".to_string(),
            address: "Toronto, ON".to_string(),
            phone: "+17186742455".to_string(),
            location: Coordinate::new_unchecked(43.6532, -79.3832),
        }
    }
}
