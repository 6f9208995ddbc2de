//! Error types for the ephemeris module

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while computing sun events
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    /// The sun never sets on this date (polar day)
    #[error("Sun stays above the horizon all day on {date} at latitude {latitude}")]
    SunAlwaysUp {
        /// Local date requested
        date: NaiveDate,
        /// Observer latitude in degrees
        latitude: f64,
    },

    /// The sun never rises on this date (polar night)
    #[error("Sun stays below the horizon all day on {date} at latitude {latitude}")]
    SunAlwaysDown {
        /// Local date requested
        date: NaiveDate,
        /// Observer latitude in degrees
        latitude: f64,
    },

    /// The computed event time could not be represented
    #[error("Event time out of range: {0}")]
    OutOfRange(String),

    /// The solar position algorithm rejected its input
    #[error("Solar position calculation failed: {0}")]
    Solar(#[from] solar_positioning::Error),
}

/// Extension of the Result type for ephemeris operations
pub type Result<T> = std::result::Result<T, EphemerisError>;
