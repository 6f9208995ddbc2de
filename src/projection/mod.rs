//! Solar position projector
//!
//! Maps the sun's azimuth/elevation onto a flat map around the observer. The
//! sun marker sits at bearing `azimuth`, at the display radius scaled by
//! `cos(max(0, elevation))`, so it slides toward the observer as the sun
//! climbs. The shadow marker points the opposite way at a fixed 70% of the
//! radius. Meters become degrees through the equirectangular approximation,
//! which is accurate for the few-hundred-meter radii used on the map.

use log::debug;
use serde::Serialize;

use crate::constants::{DEG2RAD, SHADOW_RADIUS_FRACTION};
use crate::coordinates::{meters_to_degrees, GeoPoint, Observer, SolarAngle};
use crate::ephemeris::Ephemeris;
use crate::time::Instant;
use crate::Result;

/// Projected sun and shadow markers for one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarProjection {
    /// Map position of the sun marker
    pub sun: GeoPoint,
    /// Map position of the shadow line's far end
    pub shadow: GeoPoint,
    /// Raw azimuth in degrees clockwise from north
    pub azimuth: f64,
    /// Raw elevation in degrees, negative below the horizon
    pub elevation: f64,
}

impl SolarProjection {
    /// The raw angles this projection was built from
    pub fn angle(&self) -> SolarAngle {
        SolarAngle::new(self.azimuth, self.elevation)
    }
}

/// Horizontal scale factor `cos(max(0, elevation))`
///
/// 1 at or below the horizon, 0 with the sun straight overhead.
pub fn scale_factor(elevation: f64) -> f64 {
    (elevation.max(0.0) * DEG2RAD).cos()
}

/// Project already-known solar angles around `origin`
pub fn project_angles(origin: GeoPoint, angle: SolarAngle, radius_m: f64) -> SolarProjection {
    let radius_deg = meters_to_degrees(radius_m);
    let sc = scale_factor(angle.elevation);

    let sun = origin.offset_degrees(angle.azimuth, radius_deg * sc);
    let shadow = origin.offset_degrees(angle.azimuth + 180.0, radius_deg * SHADOW_RADIUS_FRACTION);

    SolarProjection {
        sun,
        shadow,
        azimuth: angle.azimuth,
        elevation: angle.elevation,
    }
}

/// Point at the full display radius along `bearing_deg`
///
/// Used for the fixed sunrise and sunset direction rays.
pub fn edge_point(origin: GeoPoint, bearing_deg: f64, radius_m: f64) -> GeoPoint {
    origin.offset_meters(bearing_deg, radius_m)
}

/// Projects solar positions from an ephemeris onto the map
#[derive(Debug, Clone, Default)]
pub struct SolarProjector<E> {
    ephemeris: E,
}

impl<E: Ephemeris> SolarProjector<E> {
    pub fn new(ephemeris: E) -> Self {
        Self { ephemeris }
    }

    /// The ephemeris used for angles and sun events
    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    /// Project the sun's position for an observer at an instant
    pub fn project(&self, observer: &Observer, instant: &Instant, radius_m: f64) -> Result<SolarProjection> {
        let angle = self.ephemeris.solar_angles(observer, instant)?;
        debug!(
            "Sun at {}: azimuth {:.2}, elevation {:.2}",
            instant, angle.azimuth, angle.elevation
        );
        Ok(project_angles(observer.position, angle, radius_m))
    }

    /// Point on the display circle in the direction the sun has at `instant`
    pub fn edge_at(&self, observer: &Observer, instant: &Instant, radius_m: f64) -> Result<GeoPoint> {
        let angle = self.ephemeris.solar_angles(observer, instant)?;
        Ok(edge_point(observer.position, angle.azimuth, radius_m))
    }
}
