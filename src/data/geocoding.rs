//! Place-name search
//!
//! Resolves free text such as "Paris, France" to coordinates with the public
//! Nominatim search API. Lookups are best effort: an empty query, an empty or
//! malformed answer and network errors all come back as "not found".

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use super::client::JsonSource;
use crate::coordinates::GeoPoint;

/// Nominatim search endpoint
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub point: GeoPoint,
    pub display_name: Option<String>,
}

/// Free-text geocoder backed by a JSON source
#[derive(Debug, Clone)]
pub struct Geocoder<S> {
    source: S,
    url: String,
}

impl<S: JsonSource> Geocoder<S> {
    /// Geocoder using the public Nominatim endpoint
    pub fn new(source: S) -> Self {
        Self::with_url(source, NOMINATIM_SEARCH_URL)
    }

    /// Geocoder using a custom search endpoint with the Nominatim response format
    pub fn with_url(source: S, url: &str) -> Self {
        Self {
            source,
            url: url.to_string(),
        }
    }

    /// Look up a place name, returning `None` when nothing matches or the lookup fails
    pub fn search(&self, query: &str) -> Option<Place> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let params = [("q", query), ("format", "json"), ("limit", "1")];
        match self.source.get_json(&self.url, &params) {
            Ok(body) => {
                let place = parse_search_response(&body);
                match &place {
                    Some(p) => info!("Geocoded '{}' to {}", query, p.point.format_coordinates()),
                    None => info!("No match for '{}'", query),
                }
                place
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", query, e);
                None
            }
        }
    }
}

/// Read the first hit of a Nominatim JSON array
///
/// Nominatim reports coordinates as strings; plain numbers are accepted too.
pub fn parse_search_response(body: &Value) -> Option<Place> {
    let first = body.as_array()?.first()?;
    let lat = coordinate(first.get("lat")?)?;
    let lon = coordinate(first.get("lon")?)?;
    let point = GeoPoint::checked(lat, lon).ok()?;
    let display_name = first
        .get("display_name")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(Place {
        point,
        display_name,
    })
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
