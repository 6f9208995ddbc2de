//! Observer-local instants and timezone resolution
//!
//! Instants are `chrono` datetimes carrying an IANA timezone from `chrono-tz`.
//! An observer's zone is looked up from its coordinates in the `tzf-rs`
//! boundary polygons; this module also builds local instants from a date and
//! clock time and formats them for display.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use log::debug;
use tzf_rs::DefaultFinder;

use crate::coordinates::GeoPoint;
use crate::{Result, SunpathError};

/// A timezone-aware point in time
pub type Instant = DateTime<Tz>;

lazy_static! {
    /// Timezone boundary index, built on first lookup
    static ref FINDER: DefaultFinder = DefaultFinder::new();
}

/// The IANA zone containing `point`, if the boundary data names one
pub fn zone_at(point: GeoPoint) -> Option<Tz> {
    let name = FINDER.get_tz_name(point.lon, point.lat);
    name.parse::<Tz>().ok()
}

/// Resolve the timezone for an observer
///
/// An explicit IANA name (e.g. `Europe/Paris`) wins. Without one the zone is
/// looked up from the coordinates, falling back to the nominal solar zone
/// `Etc/GMT±N` with `N = round(lon / 15)` where the lookup has no answer.
pub fn resolve_zone(name: Option<&str>, point: GeoPoint) -> Result<Tz> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| SunpathError::InvalidInput(format!("Unknown timezone: {}", name))),
        None => Ok(zone_at(point).unwrap_or_else(|| {
            debug!("No timezone found at {}", point.format_coordinates());
            nominal_zone(point.lon)
        })),
    }
}

/// The `Etc/GMT` zone whose offset best matches local mean solar time
///
/// Note that `Etc/GMT` names use inverted signs: UTC+2 is `Etc/GMT-2`.
pub fn nominal_zone(longitude: f64) -> Tz {
    let hours = (longitude / 15.0).round().clamp(-12.0, 14.0) as i32;
    if hours == 0 {
        return Tz::UTC;
    }
    let name = if hours > 0 {
        format!("Etc/GMT-{}", hours)
    } else {
        format!("Etc/GMT+{}", -hours)
    };
    name.parse::<Tz>().unwrap_or(Tz::UTC)
}

/// Build the instant for a local wall-clock time on `date`
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times in a
/// DST gap are moved forward by one hour.
pub fn local_instant(date: NaiveDate, hour: u32, minute: u32, tz: Tz) -> Result<Instant> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        SunpathError::InvalidInput(format!("Invalid clock time {:02}:{:02}", hour, minute))
    })?;
    localize(NaiveDateTime::new(date, time), tz)
}

fn localize(naive: NaiveDateTime, tz: Tz) -> Result<Instant> {
    if let Some(instant) = tz.from_local_datetime(&naive).earliest() {
        return Ok(instant);
    }
    tz.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .ok_or_else(|| {
            SunpathError::InvalidInput(format!("Local time {} does not exist in {}", naive, tz))
        })
}

/// Format an instant as local `HH:MM`
pub fn format_hhmm(instant: &Instant) -> String {
    instant.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};
    use rstest::rstest;

    #[test]
    fn test_resolve_named_zone() {
        let anywhere = GeoPoint::new(0.0, 0.0);
        let tz = resolve_zone(Some("Europe/Paris"), anywhere).unwrap();
        assert_eq!(tz, chrono_tz::Europe::Paris);
        assert!(resolve_zone(Some("Mars/Olympus_Mons"), anywhere).is_err());
    }

    #[rstest]
    #[case::paris(48.8566, 2.3522, chrono_tz::Europe::Paris)]
    #[case::tokyo(35.6762, 139.6503, chrono_tz::Asia::Tokyo)]
    #[case::new_york(40.7128, -74.0060, chrono_tz::America::New_York)]
    #[case::sydney(-33.8688, 151.2093, chrono_tz::Australia::Sydney)]
    fn test_zone_looked_up_from_coordinates(#[case] lat: f64, #[case] lon: f64, #[case] expected: Tz) {
        let point = GeoPoint::new(lat, lon);
        assert_eq!(zone_at(point), Some(expected));
        assert_eq!(resolve_zone(None, point).unwrap(), expected);
        assert_eq!(resolve_zone(Some("  "), point).unwrap(), expected);
    }

    #[test]
    fn test_nominal_zone_from_longitude() {
        assert_eq!(nominal_zone(3.0), Tz::UTC);
        assert_eq!(nominal_zone(30.0), chrono_tz::Etc::GMTMinus2);
        assert_eq!(nominal_zone(-75.0), chrono_tz::Etc::GMTPlus5);
    }

    #[test]
    fn test_local_instant_and_label() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
        let t = local_instant(date, 9, 5, chrono_tz::Europe::Paris).unwrap();
        assert_eq!(format_hhmm(&t), "09:05");
        // Paris is UTC+2 in summer
        assert_eq!(t.with_timezone(&Utc).hour(), 7);
        assert!(local_instant(date, 24, 0, Tz::UTC).is_err());
    }

    #[test]
    fn test_local_instant_in_dst_gap_moves_forward() {
        // 2026-03-29 02:30 does not exist in Paris
        let date = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        let t = local_instant(date, 2, 30, chrono_tz::Europe::Paris).unwrap();
        assert_eq!(format_hhmm(&t), "03:30");
    }
}
