//! One-sample hysteresis filter for extruder pull-back tension.
//!
//! While printing, the extruder can tug on the filament and make the spool
//! briefly read heavier. An upward jump larger than the tension threshold
//! is discarded and the previous reading reused; every other sample passes
//! through untouched.

use crate::session::{SessionState, Status};

pub const DEFAULT_TENSION_THRESHOLD_G: f32 = 50.0;

/// Filter output plus whether the raw sample was discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filtered {
    pub value: f32,
    pub rejected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementFilter {
    tension_threshold_g: f32,
}

impl Default for MeasurementFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TENSION_THRESHOLD_G)
    }
}

impl MeasurementFilter {
    pub fn new(tension_threshold_g: f32) -> Self {
        Self {
            tension_threshold_g,
        }
    }

    pub fn tension_threshold_g(&self) -> f32 {
        self.tension_threshold_g
    }

    pub fn apply(&self, raw: f32, state: &SessionState) -> f32 {
        self.check(raw, state).value
    }

    pub fn check(&self, raw: f32, state: &SessionState) -> Filtered {
        let prev = state.previous_reading;
        if !raw.is_finite() {
            tracing::warn!(raw, "non-finite scale sample discarded");
            return Filtered {
                value: prev,
                rejected: true,
            };
        }
        let tension = state.status == Status::Printing
            && !state.awaiting_baseline
            && raw - prev > self.tension_threshold_g;
        if tension {
            tracing::debug!(
                raw,
                previous = prev,
                threshold = self.tension_threshold_g,
                "upward jump rejected as extruder tension"
            );
            Filtered {
                value: prev,
                rejected: true,
            }
        } else {
            Filtered {
                value: raw,
                rejected: false,
            }
        }
    }
}
