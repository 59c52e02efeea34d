//! Session state machine.
//!
//! One button drives the cycle `None → Ready → Load → Printing → Load → …`;
//! there is no terminal state and no automatic transition. The machine is the
//! only writer of `SessionState`.

use crate::filter::{Filtered, MeasurementFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    None,
    Ready,
    Load,
    Printing,
}

impl Status {
    /// Successor on a state-advance press.
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Ready,
            Self::Ready => Self::Load,
            Self::Load => Self::Printing,
            Self::Printing => Self::Load,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Idle",
            Self::Ready => "Ready",
            Self::Load => "Load",
            Self::Printing => "Run",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayUnit {
    #[default]
    Grams,
    Centimeters,
}

impl DisplayUnit {
    pub fn toggled(self) -> Self {
        match self {
            Self::Grams => Self::Centimeters,
            Self::Centimeters => Self::Grams,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Grams => "gr",
            Self::Centimeters => "cm",
        }
    }
}

/// Readings are grams net of the spool tare.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionState {
    pub status: Status,
    pub last_reading: f32,
    pub previous_reading: f32,
    pub initial_weight: f32,
    pub display_unit: DisplayUnit,
    /// Set on entry into `Printing`; the next sample is taken as the filter
    /// baseline without a tension check.
    pub awaiting_baseline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Status,
    pub to: Status,
    /// Display content from the previous state must be discarded.
    pub clear_display: bool,
}

#[derive(Debug, Default)]
pub struct SessionMachine {
    state: SessionState,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Feed one sensor sample through the filter and record it.
    pub fn ingest(&mut self, raw: f32, filter: &MeasurementFilter) -> Filtered {
        let s = &mut self.state;
        s.previous_reading = s.last_reading;
        let out = filter.check(raw, s);
        s.last_reading = out.value;
        s.awaiting_baseline = false;
        out
    }

    /// Per-iteration bookkeeping: while `Ready` the session reference tracks
    /// the live reading.
    pub fn tick(&mut self) {
        let s = &mut self.state;
        if s.status == Status::Ready {
            s.initial_weight = s.last_reading;
            s.previous_reading = s.last_reading;
        }
    }

    /// Apply one state-advance press.
    pub fn advance(&mut self) -> Transition {
        let s = &mut self.state;
        let from = s.status;
        let to = from.next();
        let clear_display = match (from, to) {
            (Status::Ready, Status::Load) => true,
            (Status::Load, Status::Printing) => {
                s.initial_weight = s.last_reading;
                s.previous_reading = s.last_reading;
                s.awaiting_baseline = true;
                true
            }
            (Status::Printing, Status::Load) => {
                s.initial_weight = s.last_reading;
                false
            }
            _ => false,
        };
        s.status = to;
        tracing::info!(
            from = ?from,
            to = ?to,
            initial_g = s.initial_weight,
            "session transition"
        );
        Transition {
            from,
            to,
            clear_display,
        }
    }

    pub fn toggle_unit(&mut self) -> DisplayUnit {
        self.state.display_unit = self.state.display_unit.toggled();
        tracing::debug!(unit = ?self.state.display_unit, "display unit toggled");
        self.state.display_unit
    }
}
