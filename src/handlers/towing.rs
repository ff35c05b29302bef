use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::AppJson;
use crate::quote::{DistanceSource, PricingPolicy, QuoteResult};
use crate::utils::geo::{Coordinate, CoordinateInput};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ShopInfoResponse {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pricing: PricingPolicy,
}

/// Shop location and towing rates, for the map and the price table
pub async fn shop_info(State(state): State<AppState>) -> Json<ShopInfoResponse> {
    let shop = state.estimator.shop();

    Json(ShopInfoResponse {
        name: shop.name.clone(),
        address: shop.address.clone(),
        phone: shop.phone.clone(),
        latitude: shop.location.latitude(),
        longitude: shop.location.longitude(),
        pricing: *state.estimator.pricing(),
    })
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub distance_km: f64,
    pub distance_text: String,
    pub duration_text: Option<String>,
    pub source: DistanceSource,
    pub base_rate: f64,
    pub extra_km: f64,
    pub extra_cost: f64,
    pub cost: f64,
    pub cost_text: String,
}

impl From<QuoteResult> for QuoteResponse {
    fn from(quote: QuoteResult) -> Self {
        Self {
            distance_text: quote.distance_text(),
            cost_text: quote.cost_text(),
            distance_km: quote.distance_km,
            duration_text: quote.duration_text,
            source: quote.source,
            base_rate: quote.cost.base,
            extra_km: quote.cost.extra_km,
            extra_cost: quote.cost.extra_cost,
            cost: quote.cost.cost,
        }
    }
}

/// Estimate the towing cost from a pickup point to the shop
pub async fn quote(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CoordinateInput>,
) -> AppResult<Json<QuoteResponse>> {
    let pickup = Coordinate::try_from(payload)?;
    let quote = state.estimator.estimate(pickup).await;

    Ok(Json(quote.into()))
}
