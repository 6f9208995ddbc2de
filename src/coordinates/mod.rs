//! Geographic and horizontal coordinates
//!
//! Observer locations, map points and the sun's horizontal (azimuth/elevation)
//! position, plus the small-area bearing offset used to place map markers.

use crate::constants::{DEG2RAD, MAX_PROJECTION_LATITUDE, METERS_PER_DEGREE};
use crate::{Result, SunpathError};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Normalize an angle in degrees to the range [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point without validation
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a point, rejecting coordinates outside ±90° / ±180° and non-finite values
    pub fn checked(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(SunpathError::InvalidInput(format!(
                "latitude {} is outside -90..90",
                lat
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(SunpathError::InvalidInput(format!(
                "longitude {} is outside -180..180",
                lon
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Offset this point by `distance_deg` degrees of arc along `bearing_deg`
    ///
    /// Uses the equirectangular approximation: the latitude offset is
    /// `d·cos(bearing)` and the longitude offset is `d·sin(bearing)/cos(lat)`,
    /// where `lat` is this point's latitude, held within ±89.99° so the
    /// longitude offset stays finite at the poles.
    pub fn offset_degrees(&self, bearing_deg: f64, distance_deg: f64) -> GeoPoint {
        let bearing = bearing_deg * DEG2RAD;
        let lat = self.lat.clamp(-MAX_PROJECTION_LATITUDE, MAX_PROJECTION_LATITUDE);
        let dlat = distance_deg * bearing.cos();
        let dlon = distance_deg * bearing.sin() / (lat * DEG2RAD).cos();
        GeoPoint::new(self.lat + dlat, self.lon + dlon)
    }

    /// Offset this point by `distance_m` meters along `bearing_deg`
    pub fn offset_meters(&self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        self.offset_degrees(bearing_deg, meters_to_degrees(distance_m))
    }

    /// Key identifying this location in caches and session state
    pub fn location_key(&self) -> String {
        format!("{}_{}", self.lat, self.lon)
    }

    /// Format as "lat, lon" with four decimals
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Convert a ground distance in meters to degrees of latitude
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// A location on Earth together with the timezone its local times are expressed in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Position of the observer
    pub position: GeoPoint,
    /// Timezone used for sun times and time labels
    pub timezone: Tz,
}

impl Observer {
    /// Create an observer at a position with an explicit timezone
    pub fn new(position: GeoPoint, timezone: Tz) -> Self {
        Self { position, timezone }
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.position.lat
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.position.lon
    }
}

/// The sun's horizontal position as seen by an observer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarAngle {
    /// Degrees clockwise from north, in [0, 360)
    pub azimuth: f64,
    /// Degrees above the horizon, negative below it
    pub elevation: f64,
}

impl SolarAngle {
    pub fn new(azimuth: f64, elevation: f64) -> Self {
        Self {
            azimuth: normalize_degrees(azimuth),
            elevation,
        }
    }

    /// Zenith angle in degrees
    pub fn zenith(&self) -> f64 {
        90.0 - self.elevation
    }

    /// Whether the sun's center is above the horizon
    pub fn is_sun_up(&self) -> bool {
        self.elevation > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_degrees() {
        assert_relative_eq!(normalize_degrees(370.0), 10.0);
        assert_relative_eq!(normalize_degrees(-90.0), 270.0);
        assert_relative_eq!(normalize_degrees(360.0), 0.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        assert!(GeoPoint::checked(91.0, 0.0).is_err());
        assert!(GeoPoint::checked(0.0, -180.5).is_err());
        assert!(GeoPoint::checked(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::checked(48.85, 2.35).is_ok());
    }

    #[test]
    fn test_offset_due_north_and_east() {
        let origin = GeoPoint::new(0.0, 0.0);

        let north = origin.offset_meters(0.0, 111_111.0);
        assert_relative_eq!(north.lat, 1.0, epsilon = 1e-12);
        assert_relative_eq!(north.lon, 0.0, epsilon = 1e-12);

        let east = origin.offset_meters(90.0, 111_111.0);
        assert_relative_eq!(east.lat, 0.0, epsilon = 1e-12);
        assert_relative_eq!(east.lon, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_at_pole_stays_finite() {
        for lat in [90.0, -90.0] {
            let pole = GeoPoint::checked(lat, 0.0).unwrap();
            let east = pole.offset_meters(90.0, 250.0);
            assert!(east.lon.is_finite());
            assert!(east.lon.abs() < 180.0, "lon {}", east.lon);
            assert_relative_eq!(east.lat, lat, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_longitude_offset_widens_with_latitude() {
        let origin = GeoPoint::new(60.0, 10.0);
        let east = origin.offset_meters(90.0, 111_111.0);
        // cos(60°) = 0.5, so one degree of arc is two degrees of longitude
        assert_relative_eq!(east.lon - origin.lon, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_solar_angle_normalizes_azimuth() {
        let angle = SolarAngle::new(-45.0, 10.0);
        assert_relative_eq!(angle.azimuth, 315.0);
        assert_relative_eq!(angle.zenith(), 80.0);
        assert!(angle.is_sun_up());
    }
}
