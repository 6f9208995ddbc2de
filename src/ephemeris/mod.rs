//! Solar ephemeris
//!
//! The [`Ephemeris`] trait is the seam between the map projection and the
//! astronomy: anything that can report the sun's azimuth/elevation and the
//! day's rise, set and transit times can drive the dashboard. The default
//! implementation is [`SpaEphemeris`].

mod errors;
pub mod spa;

pub use errors::{EphemerisError, Result};
pub use spa::{DayEvents, SpaEphemeris};

use chrono::{Duration, NaiveDate};
use log::warn;
use serde::Serialize;

use crate::constants::{FALLBACK_NOON_HOUR, FALLBACK_SUNRISE_HOUR, FALLBACK_SUNSET_HOUR};
use crate::coordinates::{Observer, SolarAngle};
use crate::time::{format_hhmm, local_instant, Instant};

/// A source of solar positions and daily sun events
pub trait Ephemeris {
    /// Azimuth and elevation of the sun for an observer at an instant
    fn solar_angles(&self, observer: &Observer, instant: &Instant) -> Result<SolarAngle>;

    /// Sunrise on a local date
    fn sunrise(&self, observer: &Observer, date: NaiveDate) -> Result<Instant>;

    /// Sunset on a local date
    fn sunset(&self, observer: &Observer, date: NaiveDate) -> Result<Instant>;

    /// Solar noon (transit) on a local date
    fn noon(&self, observer: &Observer, date: NaiveDate) -> Result<Instant>;
}

impl<E: Ephemeris + ?Sized> Ephemeris for &E {
    fn solar_angles(&self, observer: &Observer, instant: &Instant) -> Result<SolarAngle> {
        (**self).solar_angles(observer, instant)
    }

    fn sunrise(&self, observer: &Observer, date: NaiveDate) -> Result<Instant> {
        (**self).sunrise(observer, date)
    }

    fn sunset(&self, observer: &Observer, date: NaiveDate) -> Result<Instant> {
        (**self).sunset(observer, date)
    }

    fn noon(&self, observer: &Observer, date: NaiveDate) -> Result<Instant> {
        (**self).noon(observer, date)
    }
}

/// Sunrise, sunset and solar noon for one local date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: Instant,
    pub sunset: Instant,
    pub noon: Instant,
    /// True when the times are the fixed substitutes rather than computed events
    pub fallback: bool,
}

impl SunTimes {
    /// Compute the day's events, failing on polar day or night
    pub fn compute<E: Ephemeris>(
        ephemeris: &E,
        observer: &Observer,
        date: NaiveDate,
    ) -> Result<Self> {
        Ok(Self {
            sunrise: ephemeris.sunrise(observer, date)?,
            sunset: ephemeris.sunset(observer, date)?,
            noon: ephemeris.noon(observer, date)?,
            fallback: false,
        })
    }

    /// Compute the day's events, substituting 06:00 / 18:00 / 12:00 local time when
    /// any of them cannot be computed
    pub fn for_date<E: Ephemeris>(
        ephemeris: &E,
        observer: &Observer,
        date: NaiveDate,
    ) -> crate::Result<Self> {
        match Self::compute(ephemeris, observer, date) {
            Ok(times) => Ok(times),
            Err(e) => {
                warn!("Using fallback sun times for {}: {}", date, e);
                Self::fallback(observer, date)
            }
        }
    }

    /// The fixed substitute times for a date
    pub fn fallback(observer: &Observer, date: NaiveDate) -> crate::Result<Self> {
        let tz = observer.timezone;
        Ok(Self {
            sunrise: local_instant(date, FALLBACK_SUNRISE_HOUR, 0, tz)?,
            sunset: local_instant(date, FALLBACK_SUNSET_HOUR, 0, tz)?,
            noon: local_instant(date, FALLBACK_NOON_HOUR, 0, tz)?,
            fallback: true,
        })
    }

    /// Time between sunrise and sunset
    pub fn day_length(&self) -> Duration {
        self.sunset.signed_duration_since(self.sunrise)
    }

    /// `HH:MM` labels for display
    pub fn labels(&self) -> SunTimeLabels {
        SunTimeLabels {
            sunrise: format_hhmm(&self.sunrise),
            sunset: format_hhmm(&self.sunset),
            noon: format_hhmm(&self.noon),
            fallback: self.fallback,
        }
    }
}

/// Display form of [`SunTimes`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SunTimeLabels {
    pub sunrise: String,
    pub sunset: String,
    pub noon: String,
    pub fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::GeoPoint;
    use chrono_tz::Tz;

    #[test]
    fn test_sun_times_fall_back_in_polar_night() {
        let eph = SpaEphemeris::new();
        let obs = Observer::new(GeoPoint::new(78.22, 15.65), chrono_tz::Arctic::Longyearbyen);
        let date = NaiveDate::from_ymd_opt(2026, 12, 21).unwrap();

        assert!(SunTimes::compute(&eph, &obs, date).is_err());

        let times = SunTimes::for_date(&eph, &obs, date).unwrap();
        assert!(times.fallback);
        let labels = times.labels();
        assert_eq!(labels.sunrise, "06:00");
        assert_eq!(labels.sunset, "18:00");
        assert_eq!(labels.noon, "12:00");
        assert_eq!(times.day_length(), Duration::hours(12));
    }

    #[test]
    fn test_sun_times_computed_at_mid_latitude() {
        let eph = SpaEphemeris::new();
        let obs = Observer::new(GeoPoint::new(40.0, 0.0), Tz::UTC);
        let date = NaiveDate::from_ymd_opt(2026, 9, 22).unwrap();

        let times = SunTimes::for_date(&eph, &obs, date).unwrap();
        assert!(!times.fallback);
        assert!(times.sunrise < times.noon && times.noon < times.sunset);
        // Close to twelve hours at the equinox
        let hours = times.day_length().num_minutes() as f64 / 60.0;
        assert!((hours - 12.1).abs() < 0.3, "day length {}", hours);
    }
}
