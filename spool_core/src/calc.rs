//! Weight → length/percentage conversions.
//!
//! Nothing here clamps: negative consumption or more than 100 % remaining
//! are passed through and left to the render layer.

use crate::profile::{FilamentProfile, RollClass};
use crate::session::SessionState;

/// Derived quantities for one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    pub remaining_g: f32,
    pub remaining_percent: f32,
    pub remaining_m: f32,
    pub consumed_g: f32,
    pub consumed_cm: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculator {
    profile: FilamentProfile,
    roll: RollClass,
}

impl Calculator {
    pub fn new(profile: FilamentProfile, roll: RollClass) -> Self {
        Self { profile, roll }
    }

    pub fn profile(&self) -> &FilamentProfile {
        &self.profile
    }

    pub fn roll(&self) -> &RollClass {
        &self.roll
    }

    /// Centimetres of filament in `grams`.
    #[inline]
    pub fn length_from_weight(&self, grams: f32) -> f32 {
        grams * self.profile.cm_per_gram
    }

    /// Grams of filament in `cm`.
    #[inline]
    pub fn weight_from_length(&self, cm: f32) -> f32 {
        cm * self.profile.grams_per_cm
    }

    #[inline]
    pub fn remaining_percent(&self, grams: f32) -> f32 {
        grams * 100.0 / self.roll.nominal_g
    }

    #[inline]
    pub fn remaining_length_m(&self, grams: f32) -> f32 {
        self.length_from_weight(grams) / 100.0
    }

    pub fn consumed_length(&self, state: &SessionState) -> f32 {
        self.length_from_weight(consumed_grams(state))
    }

    pub fn readout(&self, state: &SessionState) -> Readout {
        let w = state.last_reading;
        Readout {
            remaining_g: w,
            remaining_percent: self.remaining_percent(w),
            remaining_m: self.remaining_length_m(w),
            consumed_g: consumed_grams(state),
            consumed_cm: self.consumed_length(state),
        }
    }
}

/// Grams used since the session reference was captured.
#[inline]
pub fn consumed_grams(state: &SessionState) -> f32 {
    state.initial_weight - state.last_reading
}
