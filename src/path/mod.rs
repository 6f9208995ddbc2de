//! Sun path sampling
//!
//! Walks the projector across a day from sunrise to sunset at a fixed step to
//! build the arc drawn on the map, the elevation curve and the animation
//! frames. Also provides the preset dates and the four-season comparison.

pub mod animation;

pub use animation::{Animation, DisplayOptions, Frame};

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::coordinates::{GeoPoint, Observer};
use crate::ephemeris::{Ephemeris, SunTimes};
use crate::projection::SolarProjector;
use crate::time::{format_hhmm, Instant};
use crate::{Result, SunpathError};

/// Instants from `start` to `end` inclusive at a fixed step
///
/// The first sample is `start`; the last is the latest step that does not
/// pass `end`. Returns an empty list when `end` precedes `start`.
pub fn sample_instants(start: &Instant, end: &Instant, step: Duration) -> Result<Vec<Instant>> {
    if step <= Duration::zero() {
        return Err(SunpathError::InvalidInput(format!(
            "Sampling step must be positive, got {} s",
            step.num_seconds()
        )));
    }

    let mut instants = Vec::new();
    let mut current = *start;
    while current <= *end {
        instants.push(current);
        current += step;
    }
    Ok(instants)
}

/// Convert a step in minutes to a `Duration`, rejecting zero
pub fn step_minutes(minutes: u32) -> Result<Duration> {
    if minutes == 0 {
        return Err(SunpathError::InvalidInput(
            "Sampling step must be at least one minute".to_string(),
        ));
    }
    Ok(Duration::minutes(minutes as i64))
}

/// One point of the day's sun path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSample {
    #[serde(skip)]
    pub instant: Instant,
    /// Local `HH:MM` label
    pub time: String,
    pub sun: GeoPoint,
    pub shadow: GeoPoint,
    pub azimuth: f64,
    pub elevation: f64,
}

/// Project the sun at each step between two instants
pub fn sample_between<E: Ephemeris>(
    projector: &SolarProjector<E>,
    observer: &Observer,
    start: &Instant,
    end: &Instant,
    radius_m: f64,
    step: Duration,
) -> Result<Vec<PathSample>> {
    sample_instants(start, end, step)?
        .into_iter()
        .map(|instant| -> Result<PathSample> {
            let p = projector.project(observer, &instant, radius_m)?;
            Ok(PathSample {
                time: format_hhmm(&instant),
                instant,
                sun: p.sun,
                shadow: p.shadow,
                azimuth: p.azimuth,
                elevation: p.elevation,
            })
        })
        .collect()
}

/// The sun's path over one local day
#[derive(Debug, Clone, PartialEq)]
pub struct DayPath {
    pub date: NaiveDate,
    pub sun_times: SunTimes,
    pub samples: Vec<PathSample>,
    /// End of the sunrise direction ray
    pub sunrise_ray: GeoPoint,
    /// End of the sunset direction ray
    pub sunset_ray: GeoPoint,
}

impl DayPath {
    /// Sample the day from sunrise to sunset
    ///
    /// Uses the fallback sun times at latitudes where the sun does not rise or set.
    pub fn sample<E: Ephemeris>(
        projector: &SolarProjector<E>,
        observer: &Observer,
        date: NaiveDate,
        radius_m: f64,
        step: Duration,
    ) -> Result<Self> {
        let sun_times = SunTimes::for_date(projector.ephemeris(), observer, date)?;
        let samples = sample_between(
            projector,
            observer,
            &sun_times.sunrise,
            &sun_times.sunset,
            radius_m,
            step,
        )?;
        debug!(
            "Sampled {} path points for {} at {}",
            samples.len(),
            date,
            observer.position.format_coordinates()
        );

        Ok(Self {
            date,
            sunrise_ray: projector.edge_at(observer, &sun_times.sunrise, radius_m)?,
            sunset_ray: projector.edge_at(observer, &sun_times.sunset, radius_m)?,
            sun_times,
            samples,
        })
    }

    /// Sun marker positions in order, for drawing the arc
    pub fn arc(&self) -> Vec<GeoPoint> {
        self.samples.iter().map(|s| s.sun).collect()
    }

    /// Highest elevation reached by any sample
    pub fn peak_elevation(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.elevation)
            .fold(None, |acc, el| Some(acc.map_or(el, |a: f64| a.max(el))))
    }
}

/// Key dates offered as presets instead of a manual date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePreset {
    SpringEquinox,
    SummerSolstice,
    AutumnalEquinox,
    WinterSolstice,
}

impl DatePreset {
    pub const ALL: [DatePreset; 4] = [
        DatePreset::SpringEquinox,
        DatePreset::SummerSolstice,
        DatePreset::AutumnalEquinox,
        DatePreset::WinterSolstice,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            DatePreset::SpringEquinox => "Spring Equinox (Mar 20)",
            DatePreset::SummerSolstice => "Summer Solstice (Jun 21)",
            DatePreset::AutumnalEquinox => "Autumnal Equinox (Sep 22)",
            DatePreset::WinterSolstice => "Winter Solstice (Dec 21)",
        }
    }

    fn month_day(&self) -> (u32, u32) {
        match self {
            DatePreset::SpringEquinox => (3, 20),
            DatePreset::SummerSolstice => (6, 21),
            DatePreset::AutumnalEquinox => (9, 22),
            DatePreset::WinterSolstice => (12, 21),
        }
    }

    /// The preset's date in `year`
    pub fn date(&self, year: i32) -> Result<NaiveDate> {
        let (month, day) = self.month_day();
        calendar_date(year, month, day)
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for DatePreset {
    type Err = SunpathError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "spring" | "spring-equinox" => Ok(DatePreset::SpringEquinox),
            "summer" | "summer-solstice" => Ok(DatePreset::SummerSolstice),
            "autumn" | "autumnal-equinox" | "autumn-equinox" => Ok(DatePreset::AutumnalEquinox),
            "winter" | "winter-solstice" => Ok(DatePreset::WinterSolstice),
            other => Err(SunpathError::InvalidInput(format!(
                "Unknown date preset: {}",
                other
            ))),
        }
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        SunpathError::InvalidInput(format!("Invalid date {}-{:02}-{:02}", year, month, day))
    })
}

/// Seasons compared on the year-round summary map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Season {
    Summer,
    Autumn,
    Spring,
    Winter,
}

impl Season {
    /// Display order on the summary map
    pub const ALL: [Season; 4] = [Season::Summer, Season::Autumn, Season::Spring, Season::Winter];

    pub fn label(&self) -> &'static str {
        match self {
            Season::Summer => "Summer (June 21)",
            Season::Autumn => "Autumn (Oct 31)",
            Season::Spring => "Spring (March 20)",
            Season::Winter => "Winter (Dec 21)",
        }
    }

    /// Line colour on the summary map
    pub fn color(&self) -> &'static str {
        match self {
            Season::Summer => "#FF0000",
            Season::Autumn => "#FF8C00",
            Season::Spring => "#FFD700",
            Season::Winter => "#FFFF00",
        }
    }

    pub fn date(&self, year: i32) -> Result<NaiveDate> {
        let (month, day) = match self {
            Season::Summer => (6, 21),
            Season::Autumn => (10, 31),
            Season::Spring => (3, 20),
            Season::Winter => (12, 21),
        };
        calendar_date(year, month, day)
    }
}

/// One season's sun arc on the summary map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalPath {
    pub season: Season,
    pub label: &'static str,
    pub color: &'static str,
    pub coords: Vec<GeoPoint>,
}

/// Sun arcs for each season of `year`
pub fn seasonal_paths<E: Ephemeris>(
    projector: &SolarProjector<E>,
    observer: &Observer,
    year: i32,
    radius_m: f64,
    step: Duration,
) -> Result<Vec<SeasonalPath>> {
    Season::ALL
        .iter()
        .map(|season| {
            let day = DayPath::sample(projector, observer, season.date(year)?, radius_m, step)?;
            Ok(SeasonalPath {
                season: *season,
                label: season.label(),
                color: season.color(),
                coords: day.arc(),
            })
        })
        .collect()
}
