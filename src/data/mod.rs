//! Third-party lookups: place-name geocoding and live air quality
//!
//! Both services are reached through [`JsonSource`], with [`HttpClient`] as the
//! production implementation.

mod air_quality;
mod client;
mod geocoding;

pub use air_quality::{
    parse_nearest_city, AirQualityClient, AqiCategory, EnvironmentDisplay, EnvironmentalData,
    AIRVISUAL_NEAREST_CITY_URL, CACHE_TTL, UNAVAILABLE,
};
pub use client::{get_cache_dir, HttpClient, JsonSource, DEFAULT_TIMEOUT_S, USER_AGENT};
pub use geocoding::{parse_search_response, Geocoder, Place, NOMINATIM_SEARCH_URL};
