//! Sunpath: the sun's daily path projected onto a map around an observer
//!
//! Given a location and a local date, this crate computes the sun's azimuth
//! and elevation, sunrise, sunset and solar noon, and projects them onto
//! ground coordinates inside a circle around the observer: a sun marker, an
//! opposite shadow line, the sunrise/sunset rays and the day's arc. Around
//! that core sit the dashboard pieces: place search, live air quality, a
//! feedback log and a serializable snapshot for rendering.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use sunpath::{DayPath, GeoPoint, SpaEphemeris, Observer, SolarProjector};
//!
//! let observer = Observer::new(GeoPoint::new(48.8566, 2.3522), chrono_tz::Europe::Paris);
//! let projector = SolarProjector::new(SpaEphemeris::new());
//! let date = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
//! let day = DayPath::sample(&projector, &observer, date, 250.0, chrono::Duration::minutes(10))?;
//! println!("{} samples, sunrise {}", day.samples.len(), day.sun_times.labels().sunrise);
//! # Ok::<(), sunpath::SunpathError>(())
//! ```

use thiserror::Error;

pub mod config;
pub mod constants;
pub mod coordinates;
pub mod dashboard;
pub mod data;
pub mod ephemeris;
pub mod feedback;
pub mod path;
pub mod projection;
pub mod session;
pub mod time;

// Re-export commonly used types
pub use config::{ConfigError, Settings};
pub use coordinates::{GeoPoint, Observer, SolarAngle};
pub use dashboard::{Dashboard, DashboardRequest};
pub use ephemeris::{Ephemeris, EphemerisError, SpaEphemeris, SunTimes};
pub use path::{Animation, DatePreset, DayPath, DisplayOptions, Frame, PathSample, Season};
pub use projection::{SolarProjection, SolarProjector};
pub use session::SessionContext;
pub use time::Instant;

/// Main error type for the sunpath library
#[derive(Debug, Error)]
pub enum SunpathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Ephemeris error: {0}")]
    Ephemeris(#[from] EphemerisError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for sunpath operations
pub type Result<T> = std::result::Result<T, SunpathError>;
