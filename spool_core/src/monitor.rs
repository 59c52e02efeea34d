//! The polling loop body (`Monitor`).
//!
//! One `step()` samples the scale, filters the sample, applies at most one
//! state transition from the advance button, handles the unit toggle,
//! recomputes the readout and redraws the display when something visible
//! changed.

use std::sync::Arc;
use std::time::Instant;

use eyre::WrapErr;
use spool_traits::clock::Clock;
use spool_traits::{Display, InputPin, OutputPin, Scale};

use crate::calc::{Calculator, Readout};
use crate::config::DisplayCfg;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::filter::MeasurementFilter;
use crate::hw_error::{map_display_error, map_hw_error};
use crate::profile::Resolved;
use crate::render::{Lines, render};
use crate::session::{SessionMachine, SessionState, Transition};
use crate::status::{SessionSnapshot, StepReport};

/// A debounced momentary button.
pub(crate) struct Button {
    pub(crate) pin: Box<dyn InputPin>,
    pub(crate) debouncer: Debouncer,
}

impl Button {
    fn pressed(&mut self, now: Instant) -> bool {
        let level = self.pin.is_high();
        self.debouncer.poll(level, now)
    }
}

pub struct Monitor<S: Scale, D: Display> {
    pub(crate) scale: S,
    pub(crate) display: D,
    pub(crate) advance: Option<Button>,
    pub(crate) unit: Option<Button>,
    pub(crate) reading_led: Option<Box<dyn OutputPin>>,
    pub(crate) session: SessionMachine,
    pub(crate) filter: MeasurementFilter,
    pub(crate) calc: Calculator,
    pub(crate) resolved: Resolved,
    pub(crate) summary: String,
    pub(crate) display_cfg: DisplayCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,

    pub(crate) drawn: Option<Lines>,
    pub(crate) drawn_weight_g: f32,
    pub(crate) pending_clear: bool,
    // a press changed what must be shown; redraw regardless of resolution
    pub(crate) pending_redraw: bool,
    pub(crate) iterations: u64,
}

impl<S: Scale, D: Display> core::fmt::Debug for Monitor<S, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("profile", &self.summary)
            .field("session", self.session.state())
            .field("iterations", &self.iterations)
            .finish()
    }
}

impl<S: Scale, D: Display> Monitor<S, D> {
    pub fn session(&self) -> &SessionState {
        self.session.state()
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calc
    }

    pub fn resolved(&self) -> &Resolved {
        &self.resolved
    }

    pub fn filter(&self) -> &MeasurementFilter {
        &self.filter
    }

    /// Lines currently on the display, if anything was drawn yet.
    pub fn lines(&self) -> Option<&Lines> {
        self.drawn.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn readout(&self) -> Readout {
        self.calc.readout(self.session.state())
    }

    /// Lines for the current state, whether or not they have been drawn.
    pub fn render_lines(&self) -> Lines {
        let s = self.session.state();
        render(
            &self.summary,
            s.status,
            s.display_unit,
            &self.readout(),
            self.display_cfg.columns,
        )
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let s = self.session.state();
        SessionSnapshot {
            status: s.status,
            unit: s.display_unit,
            initial_g: s.initial_weight,
            readout: self.readout(),
            lines: self.render_lines(),
            iterations: self.iterations,
        }
    }

    /// Apply a state-advance press without going through the button input.
    pub fn press_advance(&mut self) -> Transition {
        let t = self.session.advance();
        self.pending_clear |= t.clear_display;
        self.pending_redraw = true;
        t
    }

    /// Apply a unit-toggle press without going through the button input.
    pub fn press_unit(&mut self) {
        self.session.toggle_unit();
        self.pending_redraw = true;
    }

    /// One iteration of the loop (reads the scale internally). The reading
    /// LED, if any, is lit while the scale samples and is turned off again
    /// even when the read fails.
    pub fn step(&mut self) -> Result<StepReport> {
        if let Some(led) = self.reading_led.as_mut() {
            led.set_high();
        }
        let read = self.scale.read_weight();
        if let Some(led) = self.reading_led.as_mut() {
            led.set_low();
        }
        let gross = read
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading scale")?;
        self.step_with_weight(gross)
    }

    /// One iteration driven by an externally obtained gross weight (grams,
    /// spool included).
    pub fn step_with_weight(&mut self, gross_g: f32) -> Result<StepReport> {
        self.iterations = self.iterations.saturating_add(1);
        let net = gross_g - self.resolved.roll.tare_g;
        tracing::trace!(gross_g, net_g = net, "scale sample");
        let filtered = self.session.ingest(net, &self.filter);

        let now = self.clock.now();
        let advance_pressed = self.advance.as_mut().is_some_and(|b| b.pressed(now));
        let unit_toggled = self.unit.as_mut().is_some_and(|b| b.pressed(now));
        let transition = advance_pressed.then(|| self.press_advance());
        if unit_toggled {
            self.press_unit();
        }

        self.session.tick();

        let redrawn = self.refresh()?;
        Ok(StepReport {
            status: self.session.state().status,
            reading_g: filtered.value,
            rejected: filtered.rejected,
            transition,
            unit_toggled,
            redrawn,
        })
    }

    /// Redraw when a press changed the state or unit, or the reading moved by
    /// at least the display resolution.
    fn refresh(&mut self) -> Result<bool> {
        if self.pending_clear {
            self.display
                .clear()
                .map_err(|e| eyre::Report::new(map_display_error(&*e)))
                .wrap_err("clearing display")?;
            self.drawn = None;
            self.pending_clear = false;
        }

        let lines = self.render_lines();
        let weight = self.session.state().last_reading;
        let moved = (weight - self.drawn_weight_g).abs() >= self.display_cfg.resolution_g;
        let draw = match &self.drawn {
            None => true,
            Some(prev) => *prev != lines && (self.pending_redraw || moved),
        };
        self.pending_redraw = false;
        if !draw {
            return Ok(false);
        }

        self.display
            .show(&lines.top, &lines.bottom)
            .map_err(|e| eyre::Report::new(map_display_error(&*e)))
            .wrap_err("writing display")?;
        tracing::debug!(top = %lines.top, bottom = %lines.bottom, "display updated");
        self.drawn = Some(lines);
        self.drawn_weight_g = weight;
        Ok(true)
    }
}
