//! Animation frames for the sun marker
//!
//! A frame is what the map shows at one moment: the sun marker, the shadow
//! line's far end, a time label and the opacities that hide both when the sun
//! is down. [`Animation`] cycles through precomputed frames on a fixed
//! interval, wrapping around at the end of the day, until it is cancelled or
//! runs out of its frame budget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use serde::Serialize;

use super::PathSample;
use crate::coordinates::GeoPoint;
use crate::projection::SolarProjection;

/// Opacity of a visible shadow line
pub const SHADOW_LINE_OPACITY: f64 = 0.5;

/// When to hide the sun marker and shadow line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayOptions {
    /// Hide the markers when elevation is at or below this many degrees;
    /// `None` never hides them
    pub hide_at_or_below: Option<f64>,
}

impl DisplayOptions {
    pub fn new(hide_at_or_below: Option<f64>) -> Self {
        Self { hide_at_or_below }
    }

    /// Whether the sun marker should be drawn at this elevation
    pub fn sun_visible(&self, elevation: f64) -> bool {
        match self.hide_at_or_below {
            Some(threshold) => elevation > threshold,
            None => true,
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            hide_at_or_below: Some(0.0),
        }
    }
}

/// One rendered state of the map overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub time: String,
    pub sun: GeoPoint,
    pub shadow: GeoPoint,
    pub elevation: f64,
    pub sun_opacity: f64,
    pub shadow_opacity: f64,
}

impl Frame {
    /// Frame for a projection at a labelled time
    pub fn from_projection(projection: &SolarProjection, time: &str, options: &DisplayOptions) -> Self {
        let visible = options.sun_visible(projection.elevation);
        Self {
            time: time.to_string(),
            sun: projection.sun,
            shadow: projection.shadow,
            elevation: projection.elevation,
            sun_opacity: if visible { 1.0 } else { 0.0 },
            shadow_opacity: if visible { SHADOW_LINE_OPACITY } else { 0.0 },
        }
    }

    /// Frame for one sample of the day's path
    pub fn from_sample(sample: &PathSample, options: &DisplayOptions) -> Self {
        let visible = options.sun_visible(sample.elevation);
        Self {
            time: sample.time.clone(),
            sun: sample.sun,
            shadow: sample.shadow,
            elevation: sample.elevation,
            sun_opacity: if visible { 1.0 } else { 0.0 },
            shadow_opacity: if visible { SHADOW_LINE_OPACITY } else { 0.0 },
        }
    }

    pub fn is_visible(&self) -> bool {
        self.sun_opacity > 0.0
    }
}

/// Looping playback over a day's frames
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<Frame>,
    interval: Duration,
    cursor: usize,
}

impl Animation {
    pub fn new(frames: Vec<Frame>, interval: Duration) -> Self {
        Self {
            frames,
            interval,
            cursor: 0,
        }
    }

    /// Build frames for every sample of a path
    pub fn from_samples(samples: &[PathSample], options: &DisplayOptions, interval: Duration) -> Self {
        let frames = samples
            .iter()
            .map(|s| Frame::from_sample(s, options))
            .collect();
        Self::new(frames, interval)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Return the current frame and move to the next, wrapping to the first
    pub fn advance(&mut self) -> Option<&Frame> {
        if self.frames.is_empty() {
            return None;
        }
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.frames.len();
        self.frames.get(index)
    }

    /// Render frames on the animation interval until `cancel` is set or
    /// `max_frames` have been shown; returns the number rendered
    pub fn play<F>(&mut self, max_frames: Option<usize>, cancel: &AtomicBool, mut render: F) -> usize
    where
        F: FnMut(&Frame),
    {
        let mut rendered = 0;
        while !cancel.load(Ordering::Relaxed) {
            if max_frames.is_some_and(|max| rendered >= max) {
                break;
            }
            let interval = self.interval;
            match self.advance() {
                Some(frame) => render(frame),
                None => break,
            }
            rendered += 1;
            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::SolarAngle;
    use crate::projection::project_angles;

    fn frame(time: &str, elevation: f64) -> Frame {
        let p = project_angles(GeoPoint::new(0.0, 0.0), SolarAngle::new(90.0, elevation), 100.0);
        Frame::from_projection(&p, time, &DisplayOptions::default())
    }

    #[test]
    fn test_hide_threshold_is_inclusive() {
        let opts = DisplayOptions::default();
        assert!(!opts.sun_visible(0.0));
        assert!(opts.sun_visible(0.1));

        let civil = DisplayOptions::new(Some(-0.5));
        assert!(civil.sun_visible(-0.25));
        assert!(!civil.sun_visible(-0.5));

        assert!(DisplayOptions::new(None).sun_visible(-30.0));
    }

    #[test]
    fn test_frame_opacity() {
        let up = frame("09:00", 20.0);
        assert_eq!(up.sun_opacity, 1.0);
        assert_eq!(up.shadow_opacity, SHADOW_LINE_OPACITY);

        let down = frame("21:00", -3.0);
        assert!(!down.is_visible());
        assert_eq!(down.shadow_opacity, 0.0);
    }

    #[test]
    fn test_advance_wraps_around() {
        let mut anim = Animation::new(
            vec![frame("06:00", 1.0), frame("12:00", 60.0), frame("18:00", 1.0)],
            Duration::ZERO,
        );
        let times: Vec<String> = (0..5)
            .map(|_| anim.advance().unwrap().time.clone())
            .collect();
        assert_eq!(times, ["06:00", "12:00", "18:00", "06:00", "12:00"]);
    }

    #[test]
    fn test_play_stops_at_budget_and_on_cancel() {
        let mut anim = Animation::new(vec![frame("06:00", 1.0), frame("07:00", 10.0)], Duration::ZERO);
        let cancel = AtomicBool::new(false);

        let mut seen = Vec::new();
        let count = anim.play(Some(3), &cancel, |f| seen.push(f.time.clone()));
        assert_eq!(count, 3);
        assert_eq!(seen, ["06:00", "07:00", "06:00"]);

        let count = anim.play(None, &cancel, |_| cancel.store(true, Ordering::Relaxed));
        assert_eq!(count, 1);
    }

    #[test]
    fn test_empty_animation_renders_nothing() {
        let mut anim = Animation::new(Vec::new(), Duration::ZERO);
        assert!(anim.advance().is_none());
        assert_eq!(anim.play(None, &AtomicBool::new(false), |_| {}), 0);
    }
}
