//! Live air quality and weather for the dashboard overlay
//!
//! Queries the AirVisual `nearest_city` endpoint. Every failure (missing key,
//! network error, error status, unexpected JSON) degrades to an all
//! "unavailable" reading. Answers are cached for ten minutes per location,
//! keyed by coordinates rounded to four decimals.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use super::client::JsonSource;
use crate::constants::AQI_BAR_FULL_SCALE;
use crate::coordinates::GeoPoint;

/// AirVisual nearest-city endpoint
pub const AIRVISUAL_NEAREST_CITY_URL: &str = "http://api.airvisual.com/v2/nearest_city";

/// How long a reading stays cached
pub const CACHE_TTL: Duration = Duration::from_secs(600);

/// Placeholder shown for unavailable values
pub const UNAVAILABLE: &str = "N/A";

/// US AQI category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    Unknown,
}

impl AqiCategory {
    pub fn from_aqi(aqi: Option<u32>) -> Self {
        match aqi {
            None => AqiCategory::Unknown,
            Some(a) if a <= 50 => AqiCategory::Good,
            Some(a) if a <= 100 => AqiCategory::Moderate,
            Some(a) if a <= 150 => AqiCategory::UnhealthyForSensitive,
            Some(_) => AqiCategory::Unhealthy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitive => "Unhealthy(S)",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::Unknown => "Unknown",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00e400",
            AqiCategory::Moderate => "#ffff00",
            AqiCategory::UnhealthyForSensitive => "#ff7e00",
            AqiCategory::Unhealthy => "#ff0000",
            AqiCategory::Unknown => "#444",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Air quality and weather at the observer; `None` means unavailable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentalData {
    pub aqi: Option<u32>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub category: AqiCategory,
}

impl EnvironmentalData {
    /// A reading with every field unavailable
    pub fn unavailable() -> Self {
        Self {
            aqi: None,
            temperature_c: None,
            humidity_pct: None,
            wind_speed_ms: None,
            wind_direction_deg: None,
            category: AqiCategory::Unknown,
        }
    }

    pub fn is_available(&self) -> bool {
        self.aqi.is_some()
    }

    /// Fill level of the AQI bar, 0–100
    pub fn aqi_bar_percentage(&self) -> f64 {
        let aqi = self.aqi.unwrap_or(0) as f64;
        (aqi / AQI_BAR_FULL_SCALE * 100.0).min(100.0)
    }

    /// Display strings for the metric tiles
    pub fn display(&self) -> EnvironmentDisplay {
        EnvironmentDisplay {
            aqi: or_unavailable(self.aqi),
            temperature: or_unavailable(self.temperature_c),
            humidity: or_unavailable(self.humidity_pct),
            wind: or_unavailable(self.wind_speed_ms),
            label: self.category.label(),
            color: self.category.color(),
        }
    }
}

impl Default for EnvironmentalData {
    fn default() -> Self {
        Self::unavailable()
    }
}

fn or_unavailable<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), |v| v.to_string())
}

/// Display form of [`EnvironmentalData`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentDisplay {
    pub aqi: String,
    pub temperature: String,
    pub humidity: String,
    pub wind: String,
    pub label: &'static str,
    pub color: &'static str,
}

/// Read an AirVisual `nearest_city` response; `None` unless status is "success"
pub fn parse_nearest_city(body: &Value) -> Option<EnvironmentalData> {
    if body.get("status")?.as_str()? != "success" {
        return None;
    }
    let current = body.get("data")?.get("current")?;
    let aqi = current
        .get("pollution")?
        .get("aqius")?
        .as_u64()
        .map(|a| a.min(u32::MAX as u64) as u32)?;
    let weather = current.get("weather")?;
    let field = |name: &str| weather.get(name).and_then(Value::as_f64);

    Some(EnvironmentalData {
        aqi: Some(aqi),
        temperature_c: field("tp"),
        humidity_pct: field("hu"),
        wind_speed_ms: field("ws"),
        wind_direction_deg: field("wd"),
        category: AqiCategory::from_aqi(Some(aqi)),
    })
}

/// Cache key: coordinates rounded to four decimals
fn cache_key(point: &GeoPoint) -> (i64, i64) {
    (
        (point.lat * 10_000.0).round() as i64,
        (point.lon * 10_000.0).round() as i64,
    )
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    data: EnvironmentalData,
}

/// Air quality lookup with a short-lived per-location cache
#[derive(Debug)]
pub struct AirQualityClient<S> {
    source: S,
    api_key: Option<String>,
    url: String,
    ttl: Duration,
    cache: HashMap<(i64, i64), CacheEntry>,
}

impl<S: JsonSource> AirQualityClient<S> {
    pub fn new(source: S, api_key: Option<String>) -> Self {
        Self {
            source,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            url: AIRVISUAL_NEAREST_CITY_URL.to_string(),
            ttl: CACHE_TTL,
            cache: HashMap::new(),
        }
    }

    /// Override the cache lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the endpoint
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Number of locations with a cached reading
    pub fn cached_locations(&self) -> usize {
        self.cache.len()
    }

    /// Current reading for a location
    pub fn environment(&mut self, point: &GeoPoint) -> EnvironmentalData {
        self.environment_at(point, Instant::now())
    }

    /// Reading for a location as of `now`, served from the cache when fresh
    pub fn environment_at(&mut self, point: &GeoPoint, now: Instant) -> EnvironmentalData {
        let key = cache_key(point);
        if let Some(entry) = self.cache.get(&key) {
            if now.saturating_duration_since(entry.fetched_at) < self.ttl {
                debug!("Air quality cache hit for {}", point.format_coordinates());
                return entry.data.clone();
            }
        }

        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No AirVisual API key configured; air quality unavailable");
            return EnvironmentalData::unavailable();
        };

        let data = self.fetch(point, api_key);
        let ttl = self.ttl;
        self.cache
            .retain(|_, entry| now.saturating_duration_since(entry.fetched_at) < ttl);
        self.cache.insert(
            key,
            CacheEntry {
                fetched_at: now,
                data: data.clone(),
            },
        );
        data
    }

    fn fetch(&self, point: &GeoPoint, api_key: &str) -> EnvironmentalData {
        let lat = point.lat.to_string();
        let lon = point.lon.to_string();
        let params = [("lat", lat.as_str()), ("lon", lon.as_str()), ("key", api_key)];

        match self.source.get_json(&self.url, &params) {
            Ok(body) => match parse_nearest_city(&body) {
                Some(data) => {
                    info!(
                        "Air quality at {}: AQI {} ({})",
                        point.format_coordinates(),
                        or_unavailable(data.aqi),
                        data.category
                    );
                    data
                }
                None => {
                    warn!("Unexpected air quality response: {}", body);
                    EnvironmentalData::unavailable()
                }
            },
            Err(e) => {
                warn!("Air quality lookup failed: {}", e);
                EnvironmentalData::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, SunpathError};
    use rstest::rstest;
    use serde_json::json;
    use std::cell::Cell;

    struct Counting {
        body: Option<Value>,
        calls: Cell<usize>,
    }

    impl JsonSource for Counting {
        fn get_json(&self, _url: &str, _query: &[(&str, &str)]) -> Result<Value> {
            self.calls.set(self.calls.get() + 1);
            self.body
                .clone()
                .ok_or_else(|| SunpathError::DataError("timeout".to_string()))
        }
    }

    fn success(aqi: u64) -> Value {
        json!({
            "status": "success",
            "data": {"current": {
                "pollution": {"aqius": aqi},
                "weather": {"tp": 21, "hu": 64, "ws": 3.6, "wd": 250}
            }}
        })
    }

    #[rstest]
    #[case(Some(0), AqiCategory::Good)]
    #[case(Some(50), AqiCategory::Good)]
    #[case(Some(51), AqiCategory::Moderate)]
    #[case(Some(150), AqiCategory::UnhealthyForSensitive)]
    #[case(Some(151), AqiCategory::Unhealthy)]
    #[case(None, AqiCategory::Unknown)]
    fn test_aqi_categories(#[case] aqi: Option<u32>, #[case] expected: AqiCategory) {
        assert_eq!(AqiCategory::from_aqi(aqi), expected);
    }

    #[test]
    fn test_parse_success() {
        let data = parse_nearest_city(&success(42)).unwrap();
        assert_eq!(data.aqi, Some(42));
        assert_eq!(data.temperature_c, Some(21.0));
        assert_eq!(data.wind_direction_deg, Some(250.0));
        assert_eq!(data.category.color(), "#00e400");
        assert!((data.aqi_bar_percentage() - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_failure_status() {
        assert!(parse_nearest_city(&json!({"status": "fail", "data": {"message": "no key"}})).is_none());
        assert!(parse_nearest_city(&json!({"status": "success"})).is_none());
    }

    #[test]
    fn test_unavailable_display() {
        let display = EnvironmentalData::unavailable().display();
        assert_eq!(display.aqi, "N/A");
        assert_eq!(display.temperature, "N/A");
        assert_eq!(display.label, "Unknown");
        assert_eq!(display.color, "#444");
        assert_eq!(EnvironmentalData::unavailable().aqi_bar_percentage(), 0.0);
    }

    #[test]
    fn test_bar_is_capped() {
        let mut data = EnvironmentalData::unavailable();
        data.aqi = Some(450);
        assert_eq!(data.aqi_bar_percentage(), 100.0);
    }

    #[test]
    fn test_cache_reuses_fresh_readings() {
        let source = Counting {
            body: Some(success(80)),
            calls: Cell::new(0),
        };
        let mut client = AirQualityClient::new(&source, Some("key".to_string()));
        let t0 = Instant::now();
        let here = GeoPoint::new(52.52001, 13.40495);

        assert_eq!(client.environment_at(&here, t0).aqi, Some(80));
        // Rounds to the same key
        let nearby = GeoPoint::new(52.520014, 13.404948);
        assert_eq!(client.environment_at(&nearby, t0 + Duration::from_secs(60)).aqi, Some(80));
        assert_eq!(source.calls.get(), 1);

        client.environment_at(&here, t0 + CACHE_TTL + Duration::from_secs(1));
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_stale_entries_dropped_on_insert() {
        let source = Counting {
            body: Some(success(25)),
            calls: Cell::new(0),
        };
        let mut client = AirQualityClient::new(&source, Some("key".to_string()));
        let t0 = Instant::now();

        for i in 0..5 {
            client.environment_at(&GeoPoint::new(10.0 + i as f64, 20.0), t0);
        }
        assert_eq!(client.cached_locations(), 5);

        let later = t0 + CACHE_TTL + Duration::from_secs(1);
        client.environment_at(&GeoPoint::new(-33.0, 151.0), later);
        assert_eq!(client.cached_locations(), 1);
        assert_eq!(source.calls.get(), 6);
    }

    #[test]
    fn test_failures_degrade_to_unavailable() {
        let failing = Counting {
            body: None,
            calls: Cell::new(0),
        };
        let mut client = AirQualityClient::new(&failing, Some("key".to_string()));
        assert_eq!(client.environment(&GeoPoint::default()), EnvironmentalData::unavailable());

        let unused = Counting {
            body: Some(success(10)),
            calls: Cell::new(0),
        };
        let mut keyless = AirQualityClient::new(&unused, Some("  ".to_string()));
        assert!(!keyless.environment(&GeoPoint::default()).is_available());
        assert_eq!(unused.calls.get(), 0);
    }
}
