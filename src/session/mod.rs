//! Per-user dashboard state
//!
//! [`SessionContext`] holds what one user has selected (location, date,
//! time of day, radius) plus the GPS bookkeeping and the last environment
//! reading. It is passed explicitly to whatever renders the dashboard.

use chrono::NaiveDate;
use log::{debug, info};

use crate::constants::{DEFAULT_RADIUS_M, MAX_RADIUS_M, MIN_RADIUS_M};
use crate::coordinates::{GeoPoint, Observer};
use crate::data::{AirQualityClient, EnvironmentalData, Geocoder, JsonSource, Place};
use crate::path::DatePreset;
use crate::time::{local_instant, resolve_zone, Instant};
use crate::{Result, SunpathError};

/// Message shown when a place search has no match
pub const LOCATION_NOT_FOUND: &str = "Location not found.";

#[derive(Debug, Clone)]
pub struct SessionContext {
    coords: GeoPoint,
    timezone: Option<String>,
    gps_requested: bool,
    last_loc_key: Option<String>,
    environment: EnvironmentalData,
    date: NaiveDate,
    preset: Option<DatePreset>,
    hour: u32,
    minute: u32,
    radius_m: f64,
    environment_enabled: bool,
}

impl SessionContext {
    /// Fresh session at (0, 0) showing `date` at `hour`:00
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        Self {
            coords: GeoPoint::default(),
            timezone: None,
            gps_requested: false,
            last_loc_key: None,
            environment: EnvironmentalData::unavailable(),
            date,
            preset: None,
            hour: hour.min(23),
            minute: 0,
            radius_m: DEFAULT_RADIUS_M,
            environment_enabled: false,
        }
    }

    pub fn coords(&self) -> GeoPoint {
        self.coords
    }

    pub fn gps_requested(&self) -> bool {
        self.gps_requested
    }

    /// Use a GPS fix unless one was already taken this session
    ///
    /// Returns whether the fix moved the session.
    pub fn apply_gps_fix(&mut self, fix: GeoPoint) -> bool {
        if self.gps_requested {
            return false;
        }
        info!("GPS fix at {}", fix.format_coordinates());
        self.move_to(fix);
        self.gps_requested = true;
        true
    }

    /// Accept the next GPS fix again
    pub fn reset_gps(&mut self) {
        self.gps_requested = false;
    }

    /// New location; an explicit timezone chosen for the old one no longer applies
    fn move_to(&mut self, point: GeoPoint) {
        self.coords = point;
        self.timezone = None;
    }

    /// Move to a point clicked on the map
    pub fn select_from_map(&mut self, point: GeoPoint) -> Result<()> {
        self.move_to(GeoPoint::checked(point.lat, point.lon)?);
        Ok(())
    }

    /// Move to a searched place; on a miss the location is left unchanged
    pub fn search<S: JsonSource>(&mut self, geocoder: &Geocoder<S>, query: &str) -> Result<Place> {
        match geocoder.search(query) {
            Some(place) => {
                self.move_to(place.point);
                Ok(place)
            }
            None => Err(SunpathError::LocationNotFound(query.trim().to_string())),
        }
    }

    /// Set an explicit IANA timezone for the current location, or `None` to look it up
    pub fn set_timezone(&mut self, name: Option<&str>) -> Result<()> {
        if let Some(n) = name {
            resolve_zone(Some(n), self.coords)?;
        }
        self.timezone = name.map(str::to_string);
        Ok(())
    }

    pub fn observer(&self) -> Result<Observer> {
        let tz = resolve_zone(self.timezone.as_deref(), self.coords)?;
        Ok(Observer::new(self.coords, tz))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn preset(&self) -> Option<DatePreset> {
        self.preset
    }

    /// Manual date selection
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.preset = None;
    }

    /// Jump to a preset date in `year`
    pub fn apply_preset(&mut self, preset: DatePreset, year: i32) -> Result<()> {
        self.date = preset.date(year)?;
        self.preset = Some(preset);
        Ok(())
    }

    pub fn set_time(&mut self, hour: u32, minute: u32) -> Result<()> {
        if hour > 23 || minute > 59 {
            return Err(SunpathError::InvalidInput(format!(
                "Invalid time of day {:02}:{:02}",
                hour, minute
            )));
        }
        self.hour = hour;
        self.minute = minute;
        Ok(())
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn set_radius(&mut self, radius_m: f64) -> Result<()> {
        if !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&radius_m) {
            return Err(SunpathError::InvalidInput(format!(
                "Radius must be between {} and {} m, got {}",
                MIN_RADIUS_M, MAX_RADIUS_M, radius_m
            )));
        }
        self.radius_m = radius_m;
        Ok(())
    }

    /// The selected local time on the selected date
    pub fn sim_time(&self) -> Result<Instant> {
        let observer = self.observer()?;
        local_instant(self.date, self.hour, self.minute, observer.timezone)
    }

    pub fn set_environment_enabled(&mut self, enabled: bool) {
        self.environment_enabled = enabled;
    }

    pub fn environment_enabled(&self) -> bool {
        self.environment_enabled
    }

    /// Fetch environment data if the location changed since the last fetch
    ///
    /// Returns whether a lookup was made.
    pub fn refresh_environment<S: JsonSource>(&mut self, client: &mut AirQualityClient<S>) -> bool {
        let key = self.coords.location_key();
        if self.last_loc_key.as_deref() == Some(key.as_str()) {
            debug!("Environment data current for {}", key);
            return false;
        }
        self.environment = client.environment(&self.coords);
        self.last_loc_key = Some(key);
        true
    }

    /// Last environment reading, if the overlay is enabled
    pub fn environment(&self) -> Option<&EnvironmentalData> {
        self.environment_enabled.then_some(&self.environment)
    }

    /// Note shown when live readings are displayed for a day other than today
    pub fn live_data_warning(&self, today: NaiveDate) -> Option<String> {
        if !self.environment_enabled || self.date == today {
            return None;
        }
        Some(format!(
            "Air quality and weather are live readings and do not reflect {}.",
            self.date.format("%Y-%m-%d")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset;
    use serde_json::{json, Value};
    use std::cell::Cell;

    struct Fixed {
        body: Value,
        calls: Cell<usize>,
    }

    impl JsonSource for Fixed {
        fn get_json(&self, _url: &str, _query: &[(&str, &str)]) -> Result<Value> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.body.clone())
        }
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let session = SessionContext::new(day(10, 16), 14);
        assert_eq!(session.coords(), GeoPoint::new(0.0, 0.0));
        assert!(!session.gps_requested());
        assert_eq!(session.radius_m(), 250.0);
        // Open ocean at (0, 0) keeps UTC
        let noon = session.sim_time().unwrap();
        assert_eq!(noon.offset().fix().local_minus_utc(), 0);
        assert!(session.environment().is_none());
    }

    #[test]
    fn test_gps_fix_taken_once_until_reset() {
        let mut session = SessionContext::new(day(10, 16), 12);
        assert!(session.apply_gps_fix(GeoPoint::new(51.5, -0.12)));
        assert!(!session.apply_gps_fix(GeoPoint::new(40.7, -74.0)));
        assert_eq!(session.coords(), GeoPoint::new(51.5, -0.12));

        session.reset_gps();
        assert!(session.apply_gps_fix(GeoPoint::new(40.7, -74.0)));
        assert_eq!(session.coords(), GeoPoint::new(40.7, -74.0));
    }

    #[test]
    fn test_failed_search_keeps_location() {
        let source = Fixed {
            body: json!([]),
            calls: Cell::new(0),
        };
        let geocoder = Geocoder::new(&source);
        let mut session = SessionContext::new(day(10, 16), 12);
        session.select_from_map(GeoPoint::new(10.0, 20.0)).unwrap();

        let err = session.search(&geocoder, "Atlantis").unwrap_err();
        assert!(matches!(err, SunpathError::LocationNotFound(_)));
        assert_eq!(session.coords(), GeoPoint::new(10.0, 20.0));
    }

    #[test]
    fn test_successful_search_moves_location() {
        let source = Fixed {
            body: json!([{"lat": "35.6762", "lon": "139.6503"}]),
            calls: Cell::new(0),
        };
        let mut session = SessionContext::new(day(10, 16), 12);
        session.search(&Geocoder::new(&source), "Tokyo").unwrap();
        assert_eq!(session.coords(), GeoPoint::new(35.6762, 139.6503));
        let observer = session.observer().unwrap();
        assert_eq!(observer.timezone, chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn test_zone_follows_location() {
        let mut session = SessionContext::new(day(6, 21), 12);
        session.select_from_map(GeoPoint::new(48.8566, 2.3522)).unwrap();
        assert_eq!(session.observer().unwrap().timezone, chrono_tz::Europe::Paris);

        // Summer time applies
        let t = session.sim_time().unwrap();
        assert_eq!(t.format("%H:%M %Z").to_string(), "12:00 CEST");

        session.set_timezone(Some("America/Chicago")).unwrap();
        assert_eq!(session.observer().unwrap().timezone, chrono_tz::America::Chicago);

        session.select_from_map(GeoPoint::new(35.6762, 139.6503)).unwrap();
        assert_eq!(session.observer().unwrap().timezone, chrono_tz::Asia::Tokyo);

        session.set_timezone(Some("UTC")).unwrap();
        assert!(session.apply_gps_fix(GeoPoint::new(40.7128, -74.0060)));
        assert_eq!(session.observer().unwrap().timezone, chrono_tz::America::New_York);
    }

    #[test]
    fn test_environment_refreshed_only_on_location_change() {
        let source = Fixed {
            body: json!({"status": "success", "data": {"current": {
                "pollution": {"aqius": 30},
                "weather": {"tp": 18, "hu": 70, "ws": 2.0}
            }}}),
            calls: Cell::new(0),
        };
        let mut client = AirQualityClient::new(&source, Some("key".to_string()));
        let mut session = SessionContext::new(day(10, 16), 12);
        session.set_environment_enabled(true);

        assert!(session.refresh_environment(&mut client));
        assert!(!session.refresh_environment(&mut client));
        assert_eq!(session.environment().unwrap().aqi, Some(30));

        session.select_from_map(GeoPoint::new(1.0, 1.0)).unwrap();
        assert!(session.refresh_environment(&mut client));
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_sim_time_and_presets() {
        let mut session = SessionContext::new(day(10, 16), 12);
        session.select_from_map(GeoPoint::new(48.85, 2.35)).unwrap();
        session.set_timezone(Some("Europe/Paris")).unwrap();
        session.apply_preset(DatePreset::SummerSolstice, 2026).unwrap();
        session.set_time(9, 30).unwrap();

        let t = session.sim_time().unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M %Z").to_string(), "2026-06-21 09:30 CEST");
        assert_eq!(session.preset(), Some(DatePreset::SummerSolstice));

        session.set_date(day(1, 5));
        assert!(session.preset().is_none());

        assert!(session.set_time(24, 0).is_err());
        assert!(session.set_radius(40.0).is_err());
        assert!(session.set_timezone(Some("Mars/Olympus")).is_err());
    }

    #[test]
    fn test_live_data_warning() {
        let today = day(10, 16);
        let mut session = SessionContext::new(today, 12);
        session.set_environment_enabled(true);
        assert!(session.live_data_warning(today).is_none());

        session.set_date(day(6, 21));
        let warning = session.live_data_warning(today).unwrap();
        assert!(warning.contains("2026-06-21"));

        session.set_environment_enabled(false);
        assert!(session.live_data_warning(today).is_none());
    }
}
