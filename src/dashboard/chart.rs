//! Elevation-over-the-day chart series

use chrono::Duration;
use serde::Serialize;

use crate::constants::{GOLDEN_HOUR_MAX_DEG, TWILIGHT_MIN_DEG};
use crate::coordinates::Observer;
use crate::ephemeris::{Ephemeris, SunTimes};
use crate::path::sample_between;
use crate::projection::SolarProjector;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: String,
    pub elevation: f64,
}

/// Shaded horizontal reference band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBand {
    pub label: &'static str,
    pub min_elevation: f64,
    pub max_elevation: f64,
}

/// Reference bands drawn behind the curve
pub fn reference_bands() -> Vec<ChartBand> {
    vec![
        ChartBand {
            label: "Golden Hour",
            min_elevation: 0.0,
            max_elevation: GOLDEN_HOUR_MAX_DEG,
        },
        ChartBand {
            label: "Twilight",
            min_elevation: TWILIGHT_MIN_DEG,
            max_elevation: 0.0,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationChart {
    pub points: Vec<ChartPoint>,
    pub bands: Vec<ChartBand>,
}

impl ElevationChart {
    /// Elevation from sunrise to sunset at `step`
    pub fn sample<E: Ephemeris>(
        projector: &SolarProjector<E>,
        observer: &Observer,
        sun_times: &SunTimes,
        step: Duration,
    ) -> Result<Self> {
        // Radius does not affect elevation; any positive value will do
        let samples = sample_between(
            projector,
            observer,
            &sun_times.sunrise,
            &sun_times.sunset,
            1.0,
            step,
        )?;
        let points = samples
            .into_iter()
            .map(|s| ChartPoint {
                time: s.time,
                elevation: s.elevation,
            })
            .collect();
        Ok(Self {
            points,
            bands: reference_bands(),
        })
    }

    pub fn max_elevation(&self) -> Option<f64> {
        self.points.iter().map(|p| p.elevation).reduce(f64::max)
    }
}
