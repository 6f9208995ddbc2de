//! Sun position and daily events from NREL's Solar Position Algorithm
//!
//! Positions come straight from `solar_positioning::spa`. Daily events are
//! computed per UTC day by the same crate, which reports each crossing
//! within that day on its own. A local date is therefore anchored on its
//! solar transit: sunrise is the rising crossing before it and sunset the
//! setting crossing after it, taken from the neighbouring UTC day when the
//! crossing wraps past midnight. At high latitudes in summer this keeps a
//! sunset at 00:20 on the following morning instead of the previous one.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;
use solar_positioning::time::DeltaT;
use solar_positioning::{spa, Horizon, RefractionCorrection, SunriseResult};

use super::errors::{EphemerisError, Result};
use super::Ephemeris;
use crate::coordinates::{Observer, SolarAngle};
use crate::time::Instant;

/// Observer height above sea level in metres
const OBSERVER_ELEVATION_M: f64 = 0.0;

/// Sunrise, transit and sunset as reported for one UTC day
type UtcEvents = SunriseResult<DateTime<Utc>>;

/// Sunrise, transit and sunset for one local date
pub type DayEvents = SunriseResult<Instant>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Rising,
    Setting,
}

/// Solar ephemeris backed by the NREL SPA
///
/// Rise and set use the standard -0.833° horizon (refraction plus the solar
/// semi-diameter). Refraction on reported elevations can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaEphemeris {
    refraction: bool,
}

impl SpaEphemeris {
    pub fn new() -> Self {
        Self { refraction: true }
    }

    /// Enable or disable atmospheric refraction on reported elevations
    pub fn with_refraction(mut self, refraction: bool) -> Self {
        self.refraction = refraction;
        self
    }

    pub fn refraction(&self) -> bool {
        self.refraction
    }

    fn utc_day_events(&self, observer: &Observer, day: NaiveDate) -> Result<UtcEvents> {
        let midnight = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| EphemerisError::OutOfRange(format!("no UTC midnight on {}", day)))?
            .and_utc();
        let delta_t = DeltaT::estimate_from_date_like(day)?;
        Ok(spa::sunrise_sunset_for_horizon(
            midnight,
            observer.latitude(),
            observer.longitude(),
            delta_t,
            Horizon::SunriseSunset,
        )?)
    }

    /// The UTC day whose transit falls on the local `date`, with its events
    fn anchor_day(&self, observer: &Observer, date: NaiveDate) -> Result<(NaiveDate, UtcEvents)> {
        let mut first = None;
        for shift in [0i64, -1, 1] {
            let day = date + Duration::days(shift);
            let events = self.utc_day_events(observer, day)?;
            if events.transit().with_timezone(&observer.timezone).date_naive() == date {
                return Ok((day, events));
            }
            first.get_or_insert((day, events));
        }
        first.ok_or_else(|| EphemerisError::OutOfRange(format!("no solar noon on {}", date)))
    }

    /// Rising crossing of the UTC day before `day`, or setting crossing of the day after
    fn adjacent_crossing(
        &self,
        observer: &Observer,
        day: NaiveDate,
        crossing: Crossing,
        date: NaiveDate,
    ) -> Result<DateTime<Utc>> {
        let neighbour = match crossing {
            Crossing::Rising => day - Duration::days(1),
            Crossing::Setting => day + Duration::days(1),
        };
        debug!("{:?} crossing for {} taken from UTC day {}", crossing, date, neighbour);
        match self.utc_day_events(observer, neighbour)? {
            SunriseResult::RegularDay {
                sunrise, sunset, ..
            } => Ok(match crossing {
                Crossing::Rising => sunrise,
                Crossing::Setting => sunset,
            }),
            other => Err(no_crossing(&other, observer, date)),
        }
    }

    /// Sunrise, solar noon and sunset around the transit on the local `date`
    ///
    /// Sunrise always precedes the transit and sunset always follows it, so
    /// either may land on the previous or next local date.
    pub fn events(&self, observer: &Observer, date: NaiveDate) -> Result<DayEvents> {
        let tz = observer.timezone;
        let (day, events) = self.anchor_day(observer, date)?;

        Ok(match events {
            SunriseResult::RegularDay {
                sunrise,
                transit,
                sunset,
            } => {
                let sunrise = if sunrise <= transit {
                    sunrise
                } else {
                    self.adjacent_crossing(observer, day, Crossing::Rising, date)?
                };
                let sunset = if sunset >= transit {
                    sunset
                } else {
                    self.adjacent_crossing(observer, day, Crossing::Setting, date)?
                };
                SunriseResult::RegularDay {
                    sunrise: sunrise.with_timezone(&tz),
                    transit: transit.with_timezone(&tz),
                    sunset: sunset.with_timezone(&tz),
                }
            }
            SunriseResult::AllDay { transit } => SunriseResult::AllDay {
                transit: transit.with_timezone(&tz),
            },
            SunriseResult::AllNight { transit } => SunriseResult::AllNight {
                transit: transit.with_timezone(&tz),
            },
        })
    }
}

impl Default for SpaEphemeris {
    fn default() -> Self {
        Self::new()
    }
}

/// Polar day or night as an error for the requested date
fn no_crossing<T>(events: &SunriseResult<T>, observer: &Observer, date: NaiveDate) -> EphemerisError {
    let latitude = observer.latitude();
    if events.is_polar_night() {
        EphemerisError::SunAlwaysDown { date, latitude }
    } else {
        EphemerisError::SunAlwaysUp { date, latitude }
    }
}

impl Ephemeris for SpaEphemeris {
    fn solar_angles(&self, observer: &Observer, instant: &Instant) -> Result<SolarAngle> {
        let delta_t = DeltaT::estimate_from_date_like(instant.date_naive())?;
        let refraction = self.refraction.then(RefractionCorrection::standard);
        let position = spa::solar_position(
            *instant,
            observer.latitude(),
            observer.longitude(),
            OBSERVER_ELEVATION_M,
            delta_t,
            refraction,
        )?;
        Ok(SolarAngle::new(position.azimuth(), position.elevation_angle()))
    }

    fn sunrise(&self, observer: &Observer, date: NaiveDate) -> Result<Instant> {
        match self.events(observer, date)? {
            SunriseResult::RegularDay { sunrise, .. } => Ok(sunrise),
            other => Err(no_crossing(&other, observer, date)),
        }
    }

    fn sunset(&self, observer: &Observer, date: NaiveDate) -> Result<Instant> {
        match self.events(observer, date)? {
            SunriseResult::RegularDay { sunset, .. } => Ok(sunset),
            other => Err(no_crossing(&other, observer, date)),
        }
    }

    fn noon(&self, observer: &Observer, date: NaiveDate) -> Result<Instant> {
        Ok(*self.events(observer, date)?.transit())
    }
}
