use serde::Serialize;

/// Tiered linear towing price: a flat rate covers the first
/// `base_distance_km`, every kilometre beyond that costs `per_km_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingPolicy {
    pub base_rate: f64,
    pub base_distance_km: f64,
    pub per_km_rate: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            base_rate: 100.0,
            base_distance_km: 10.0,
            per_km_rate: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub cost: f64,
    pub base: f64,
    pub extra_km: f64,
    pub extra_cost: f64,
}

/// Price a tow of `distance_km` under `policy`.
///
/// Negative or non-finite distances are treated as zero.
pub fn calculate_cost(distance_km: f64, policy: &PricingPolicy) -> CostBreakdown {
    let distance_km = clamp_distance(distance_km);
    let extra_km = (distance_km - policy.base_distance_km).max(0.0);
    let extra_cost = extra_km * policy.per_km_rate;

    CostBreakdown {
        cost: policy.base_rate + extra_cost,
        base: policy.base_rate,
        extra_km,
        extra_cost,
    }
}

pub(crate) fn clamp_distance(distance_km: f64) -> f64 {
    if distance_km.is_finite() && distance_km > 0.0 {
        distance_km
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_base_distance_is_flat() {
        let policy = PricingPolicy::default();
        for distance in [0.0, 0.5, 9.99, 10.0] {
            let result = calculate_cost(distance, &policy);
            assert_eq!(result.cost, 100.0);
            assert_eq!(result.extra_km, 0.0);
            assert_eq!(result.extra_cost, 0.0);
        }
    }

    #[test]
    fn test_beyond_base_distance() {
        let policy = PricingPolicy::default();
        let result = calculate_cost(25.0, &policy);

        assert_eq!(result.extra_km, 15.0);
        assert_eq!(result.extra_cost, 225.0);
        assert_eq!(result.cost, 325.0);
        assert_eq!(format!("{:.2}", result.cost), "325.00");
    }

    #[test]
    fn test_negative_distance_clamped() {
        let policy = PricingPolicy::default();
        assert_eq!(calculate_cost(-5.0, &policy).cost, policy.base_rate);
        assert_eq!(calculate_cost(f64::NAN, &policy).cost, policy.base_rate);
    }

    #[test]
    fn test_monotonic_beyond_base() {
        let policy = PricingPolicy {
            base_rate: 80.0,
            base_distance_km: 5.0,
            per_km_rate: 2.5,
        };

        let mut previous = calculate_cost(5.0, &policy).cost;
        for step in 1..200 {
            let distance = 5.0 + step as f64 * 0.75;
            let result = calculate_cost(distance, &policy);
            let expected = 80.0 + (distance - 5.0) * 2.5;

            assert!((result.cost - expected).abs() < 1e-9);
            assert!(result.cost > previous);
            previous = result.cost;
        }
    }
}
