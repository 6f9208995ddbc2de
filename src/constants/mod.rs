//! Constants module for solar and map-projection calculations

use std::f64::consts::PI;

// Map projection
/// Meters per degree of latitude used by the equirectangular approximation
pub const METERS_PER_DEGREE: f64 = 111_111.0;
/// Fraction of the display radius used for the shadow marker
pub const SHADOW_RADIUS_FRACTION: f64 = 0.7;
/// Smallest display radius accepted by the dashboard, in meters
pub const MIN_RADIUS_M: f64 = 50.0;
/// Largest display radius accepted by the dashboard, in meters
pub const MAX_RADIUS_M: f64 = 500.0;
/// Default display radius in meters
pub const DEFAULT_RADIUS_M: f64 = 250.0;

// Angles
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Latitude limit for map offsets, where cos(latitude) vanishes at the poles
pub const MAX_PROJECTION_LATITUDE: f64 = 89.99;

// Fallback sun times, used when rise/set cannot be computed (polar day or night)
/// Local hour substituted for sunrise
pub const FALLBACK_SUNRISE_HOUR: u32 = 6;
/// Local hour substituted for sunset
pub const FALLBACK_SUNSET_HOUR: u32 = 18;
/// Local hour substituted for solar noon
pub const FALLBACK_NOON_HOUR: u32 = 12;

// Chart reference bands
/// Upper edge of the golden hour band, in degrees of elevation
pub const GOLDEN_HOUR_MAX_DEG: f64 = 6.0;
/// Lower edge of the civil twilight band, in degrees of elevation
pub const TWILIGHT_MIN_DEG: f64 = -6.0;

// Air quality
/// AQI that fills the dashboard bar completely
pub const AQI_BAR_FULL_SCALE: f64 = 300.0;
