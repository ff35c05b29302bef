use serde::{Deserialize, Serialize};
use thiserror::Error;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Invalid latitude {0}: must be a number between -90 and 90")]
    Latitude(f64),
    #[error("Invalid longitude {0}: must be a number between -180 and 180")]
    Longitude(f64),
}

/// A point on the Earth's surface in decimal degrees.
///
/// Validated on construction, so every value in the system is finite and
/// within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    /// For compile-time constants that are known to be in range.
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Raw coordinate as received over the wire, validated with `TryFrom`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CoordinateInput {
    pub latitude: f64,
    pub longitude: f64,
}

impl TryFrom<CoordinateInput> for Coordinate {
    type Error = CoordinateError;

    fn try_from(input: CoordinateInput) -> Result<Self, Self::Error> {
        Coordinate::new(input.latitude, input.longitude)
    }
}

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
pub fn great_circle_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_distance_toronto_hamilton() {
        let toronto = coord(43.6532, -79.3832);
        let hamilton = coord(43.2557, -79.8711);

        let distance = great_circle_distance_km(toronto, hamilton);
        // Roughly 58 km as the crow flies
        assert!(distance > 55.0 && distance < 62.0, "got {}", distance);
    }

    #[test]
    fn test_same_point_is_zero() {
        let shop = coord(43.6532, -79.3832);
        assert_eq!(great_circle_distance_km(shop, shop), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            (coord(43.6532, -79.3832), coord(40.7128, -74.0060)),
            (coord(-33.8688, 151.2093), coord(51.5074, -0.1278)),
            (coord(0.0, 179.9), coord(0.0, -179.9)),
        ];

        for (a, b) in pairs {
            assert_eq!(great_circle_distance_km(a, b), great_circle_distance_km(b, a));
        }
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let distance = great_circle_distance_km(coord(0.0, 0.0), coord(0.0, 180.0));
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(Coordinate::new(90.5, 0.0), Err(CoordinateError::Latitude(90.5)));
        assert_eq!(Coordinate::new(0.0, -180.5), Err(CoordinateError::Longitude(-180.5)));
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_input_conversion() {
        let input = CoordinateInput { latitude: 43.7, longitude: -79.4 };
        let coordinate = Coordinate::try_from(input).unwrap();
        assert_eq!(coordinate.latitude(), 43.7);
        assert_eq!(coordinate.longitude(), -79.4);
    }
}
