use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::quote::{PricingPolicy, ShopLocation};
use crate::utils::geo::Coordinate;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub admin_email: String,
    pub admin_password: String,
    pub shop: ShopLocation,
    pub pricing: PricingPolicy,
    pub routing: RoutingConfig,
}

#[derive(Clone, Debug)]
pub struct RoutingConfig {
    /// OSRM-compatible base URL; `None` disables routed distances.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: Some("https://router.project-osrm.org".to_string()),
            timeout: Duration::from_secs(8),
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let shop_defaults = ShopLocation::default();
        let pricing_defaults = PricingPolicy::default();
        let routing_defaults = RoutingConfig::default();

        let shop_location = Coordinate::new(
            parse_or("SHOP_LAT", shop_defaults.location.latitude())?,
            parse_or("SHOP_LNG", shop_defaults.location.longitude())?,
        )
        .map_err(|e| AppError::Internal(format!("Invalid shop location: {}", e)))?;

        let routing_base_url = match env::var("ROUTING_BASE_URL") {
            Ok(url) if url.trim().is_empty() => None,
            Ok(url) => Some(url),
            Err(_) => routing_defaults.base_url,
        };

        let pricing = PricingPolicy {
            base_rate: parse_or("PRICING_BASE_RATE", pricing_defaults.base_rate)?,
            base_distance_km: parse_or("PRICING_BASE_DISTANCE_KM", pricing_defaults.base_distance_km)?,
            per_km_rate: parse_or("PRICING_PER_KM_RATE", pricing_defaults.per_km_rate)?,
        };
        if [pricing.base_rate, pricing.base_distance_km, pricing.per_km_rate]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(AppError::Internal(
                "Pricing values must be non-negative numbers".to_string(),
            ));
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 168)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_or("SERVER_PORT", 3000)?,
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@autoshop.local".to_string()),
            admin_password: required("ADMIN_PASSWORD")?,
            shop: ShopLocation {
                name: env::var("SHOP_NAME").unwrap_or(shop_defaults.name),
                address: env::var("SHOP_ADDRESS").unwrap_or(shop_defaults.address),
                phone: env::var("SHOP_PHONE").unwrap_or(shop_defaults.phone),
                location: shop_location,
            },
            pricing,
            routing: RoutingConfig {
                base_url: routing_base_url,
                timeout: Duration::from_secs(parse_or(
                    "ROUTING_TIMEOUT_SECS",
                    routing_defaults.timeout.as_secs(),
                )?),
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &str) -> AppResult<String> {
    env::var(key).map_err(|_| AppError::Internal(format!("{} must be set", key)))
}

fn parse_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} must be a number, got {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let value: u16 = parse_or("AUTO_SHOP_TEST_SURELY_UNSET_PORT", 4242).unwrap();
        assert_eq!(value, 4242);
    }

    #[test]
    fn test_required_reports_missing_key() {
        let err = required("AUTO_SHOP_TEST_SURELY_UNSET_SECRET").unwrap_err();
        assert!(err.to_string().contains("AUTO_SHOP_TEST_SURELY_UNSET_SECRET must be set"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config {
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_expiration_hours: 1,
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            admin_email: "admin@test".to_string(),
            admin_password: "password".to_string(),
            shop: ShopLocation::default(),
            pricing: PricingPolicy::default(),
            routing: RoutingConfig::default(),
        };
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }
}
