//! Dashboard snapshot
//!
//! Everything the map and chart renderer needs for one view, computed in a
//! single pass and serializable to JSON: sun times, rise/set rays, the day's
//! path and animation frames, the elevation chart, the selected-time marker
//! and metrics, and the optional seasonal arcs and environment overlay.

pub mod chart;

pub use chart::{reference_bands, ChartBand, ChartPoint, ElevationChart};

use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::config::Settings;
use crate::coordinates::{GeoPoint, Observer};
use crate::data::{EnvironmentDisplay, EnvironmentalData};
use crate::ephemeris::{Ephemeris, SunTimeLabels};
use crate::path::{
    seasonal_paths, step_minutes, DayPath, DisplayOptions, Frame, PathSample, SeasonalPath,
};
use crate::projection::{SolarProjection, SolarProjector};
use crate::session::SessionContext;
use crate::time::{format_hhmm, Instant};
use crate::Result;

/// Warning shown when the sun is below the true horizon (elevation ≤ 0°)
///
/// Independent of [`DisplayOptions::hide_at_or_below`], which only controls
/// drawing: with hiding disabled or lowered the marker can be drawn while
/// this warning is shown.
pub fn below_horizon_warning(elevation: f64) -> Option<String> {
    (elevation <= 0.0).then(|| {
        format!(
            "The sun is currently below the horizon ({:.1}°).",
            elevation
        )
    })
}

/// Metric tiles for the selected time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub selected_time: String,
    pub azimuth: String,
    pub elevation: String,
    pub solar_noon: String,
    pub warning: Option<String>,
}

impl Metrics {
    pub fn new(selected: &Instant, projection: &SolarProjection, sun_times: &SunTimeLabels) -> Self {
        Self {
            selected_time: format_hhmm(selected),
            azimuth: format!("{:.1}°", projection.azimuth),
            elevation: format!("{:.1}°", projection.elevation),
            solar_noon: sun_times.noon.clone(),
            warning: below_horizon_warning(projection.elevation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub point: GeoPoint,
    pub coordinates: String,
    pub timezone: String,
}

impl LocationSummary {
    fn new(observer: &Observer) -> Self {
        Self {
            point: observer.position,
            coordinates: observer.position.format_coordinates(),
            timezone: observer.timezone.name().to_string(),
        }
    }
}

/// Sunrise and sunset direction rays, both at the full radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rays {
    pub sunrise: GeoPoint,
    pub sunset: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentOverlay {
    pub data: EnvironmentalData,
    pub display: EnvironmentDisplay,
    pub aqi_bar_percentage: f64,
}

impl From<EnvironmentalData> for EnvironmentOverlay {
    fn from(data: EnvironmentalData) -> Self {
        Self {
            display: data.display(),
            aqi_bar_percentage: data.aqi_bar_percentage(),
            data,
        }
    }
}

/// Inputs for one dashboard view
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub observer: Observer,
    pub date: NaiveDate,
    pub selected: Instant,
    pub radius_m: f64,
    pub step: Duration,
    pub chart_step: Duration,
    /// Year of the seasonal comparison, if it should be drawn
    pub seasonal_year: Option<i32>,
    pub seasonal_step: Duration,
    pub display: DisplayOptions,
    pub animation_interval: StdDuration,
    pub environment: Option<EnvironmentalData>,
    pub notices: Vec<String>,
}

impl DashboardRequest {
    /// Request using the steps, radius and display options from `settings`
    pub fn new(
        observer: Observer,
        date: NaiveDate,
        selected: Instant,
        settings: &Settings,
    ) -> Result<Self> {
        Ok(Self {
            observer,
            date,
            selected,
            radius_m: settings.radius_m(),
            step: step_minutes(settings.step_minutes())?,
            chart_step: step_minutes(settings.chart_step_minutes())?,
            seasonal_year: None,
            seasonal_step: step_minutes(settings.seasonal_step_minutes())?,
            display: settings.display_options(),
            animation_interval: settings.animation_interval(),
            environment: None,
            notices: Vec::new(),
        })
    }

    /// Request for what a session currently shows
    pub fn from_session(session: &SessionContext, settings: &Settings, today: NaiveDate) -> Result<Self> {
        let mut request = Self::new(
            session.observer()?,
            session.date(),
            session.sim_time()?,
            settings,
        )?;
        request.radius_m = session.radius_m();
        request.environment = session.environment().cloned();
        request.notices.extend(session.live_data_warning(today));
        Ok(request)
    }

    pub fn with_seasons(mut self, year: i32) -> Self {
        self.seasonal_year = Some(year);
        self
    }

    pub fn with_environment(mut self, environment: EnvironmentalData) -> Self {
        self.environment = Some(environment);
        self
    }
}

/// Serializable dashboard view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub location: LocationSummary,
    pub date: NaiveDate,
    pub radius_m: f64,
    pub sun_times: SunTimeLabels,
    pub day_length_minutes: i64,
    pub rays: Rays,
    pub path: Vec<PathSample>,
    pub frames: Vec<Frame>,
    pub animation_interval_ms: u128,
    pub chart: ElevationChart,
    pub seasonal: Option<Vec<SeasonalPath>>,
    pub selected: Frame,
    pub metrics: Metrics,
    pub environment: Option<EnvironmentOverlay>,
    pub notices: Vec<String>,
}

impl Dashboard {
    pub fn build<E: Ephemeris>(projector: &SolarProjector<E>, request: &DashboardRequest) -> Result<Self> {
        let observer = &request.observer;
        let day = DayPath::sample(projector, observer, request.date, request.radius_m, request.step)?;
        let labels = day.sun_times.labels();

        let chart = ElevationChart::sample(projector, observer, &day.sun_times, request.chart_step)?;
        let seasonal = match request.seasonal_year {
            Some(year) => Some(seasonal_paths(
                projector,
                observer,
                year,
                request.radius_m,
                request.seasonal_step,
            )?),
            None => None,
        };

        let now = projector.project(observer, &request.selected, request.radius_m)?;
        let selected = Frame::from_projection(&now, &format_hhmm(&request.selected), &request.display);
        let metrics = Metrics::new(&request.selected, &now, &labels);

        let frames = day
            .samples
            .iter()
            .map(|s| Frame::from_sample(s, &request.display))
            .collect();

        let mut notices = request.notices.clone();
        if day.sun_times.fallback {
            notices.push(format!(
                "Sunrise and sunset could not be computed for {}; showing 06:00 to 18:00.",
                request.date
            ));
        }

        debug!(
            "Dashboard for {} on {}: {} path samples",
            observer.position.format_coordinates(),
            request.date,
            day.samples.len()
        );

        Ok(Self {
            location: LocationSummary::new(observer),
            date: request.date,
            radius_m: request.radius_m,
            day_length_minutes: day.sun_times.day_length().num_minutes(),
            sun_times: labels,
            rays: Rays {
                sunrise: day.sunrise_ray,
                sunset: day.sunset_ray,
            },
            path: day.samples,
            frames,
            animation_interval_ms: request.animation_interval.as_millis(),
            chart,
            seasonal,
            selected,
            metrics,
            environment: request.environment.clone().map(EnvironmentOverlay::from),
            notices,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
