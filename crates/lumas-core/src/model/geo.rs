// ── Coordinates ──

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A WGS84 position in decimal degrees.
///
/// Both components must be finite. No geographic bound is enforced:
/// fixtures are placed on a flat-earth approximation at airfield scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point, rejecting NaN and infinite components.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() {
            return Err(CoreError::validation("lat", format!("{lat} is not a finite number")));
        }
        if !lng.is_finite() {
            return Err(CoreError::validation("lng", format!("{lng} is not a finite number")));
        }
        Ok(Self { lat, lng })
    }

    /// Linear interpolation towards `other`; `ratio` 0 is `self`, 1 is `other`.
    pub fn lerp(&self, other: &GeoPoint, ratio: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * ratio,
            lng: self.lng + (other.lng - self.lng) * ratio,
        }
    }

    pub fn offset(&self, d_lat: f64, d_lng: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + d_lat,
            lng: self.lng + d_lng,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}
