//! Type-state builder for `Monitor` and generic `build_monitor` constructor.
//!
//! The builder enforces at compile time that a Scale and a Display are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use spool_traits::clock::{Clock, MonotonicClock};
use spool_traits::{Display, InputPin, OutputPin, Scale};

use crate::calc::Calculator;
use crate::config::DisplayCfg;
use crate::debounce::{DebounceCfg, Debouncer};
use crate::error::{BuildError, Result};
use crate::filter::MeasurementFilter;
use crate::monitor::{Button, Monitor};
use crate::profile::{ProfileResolver, RollTares, SelectorLevels};
use crate::session::SessionMachine;

/// Monitor over boxed collaborators, as produced by `MonitorBuilder`.
pub type SpoolMonitor = Monitor<Box<dyn Scale>, Box<dyn Display>>;

impl SpoolMonitor {
    /// Start building a monitor.
    pub fn builder() -> MonitorBuilder<Missing, Missing> {
        MonitorBuilder::default()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Everything besides the scale and display.
#[derive(Default)]
pub struct Parts {
    pub levels: Option<SelectorLevels>,
    pub tares: Option<RollTares>,
    pub filter: Option<MeasurementFilter>,
    pub display: Option<DisplayCfg>,
    pub debounce: Option<DebounceCfg>,
    pub advance_button: Option<Box<dyn InputPin>>,
    pub unit_button: Option<Box<dyn InputPin>>,
    pub reading_led: Option<Box<dyn OutputPin>>,
    pub clock: Option<Box<dyn Clock + Send + Sync>>,
}

/// Builder for `SpoolMonitor`. All fields are validated on `build()`.
pub struct MonitorBuilder<S, D> {
    scale: Option<Box<dyn Scale>>,
    display: Option<Box<dyn Display>>,
    parts: Parts,
    _s: PhantomData<S>,
    _d: PhantomData<D>,
}

impl Default for MonitorBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            scale: None,
            display: None,
            parts: Parts::default(),
            _s: PhantomData,
            _d: PhantomData,
        }
    }
}

/// Validate configuration and construct a `Monitor`.
///
/// Single source of truth for validation, used by both
/// `MonitorBuilder::try_build()` and `build_monitor()`.
fn validate_and_build<S: Scale, D: Display>(scale: S, display: D, parts: Parts) -> Result<Monitor<S, D>> {
    let levels = parts
        .levels
        .ok_or_else(|| eyre::Report::new(BuildError::MissingSelectors))?;
    let filter = parts.filter.unwrap_or_default();
    let display_cfg = parts.display.unwrap_or_default();
    let debounce = parts.debounce.unwrap_or_default();

    // ── Validation ───────────────────────────────────────────────────────────
    let t = filter.tension_threshold_g();
    if !t.is_finite() || t <= 0.0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "tension_threshold_g must be > 0",
        )));
    }
    if !(8..=40).contains(&display_cfg.columns) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "display columns must be in [8, 40]",
        )));
    }
    if !display_cfg.resolution_g.is_finite() || display_cfg.resolution_g < 0.0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "display resolution_g must be >= 0",
        )));
    }
    let resolver = ProfileResolver::new(parts.tares.unwrap_or_default())?;
    let resolved = resolver.resolve(levels);

    let clock: Arc<dyn Clock + Send + Sync> = match parts.clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let now = clock.now();
    let button = |pin: Box<dyn InputPin>| Button {
        pin,
        debouncer: Debouncer::new(debounce, now),
    };

    Ok(Monitor {
        scale,
        display,
        advance: parts.advance_button.map(button),
        unit: parts.unit_button.map(button),
        reading_led: parts.reading_led,
        session: SessionMachine::new(),
        filter,
        calc: Calculator::new(resolved.profile, resolved.roll),
        summary: resolved.summary(),
        resolved,
        display_cfg,
        clock,
        drawn: None,
        drawn_weight_g: 0.0,
        pending_clear: false,
        pending_redraw: false,
        iterations: 0,
    })
}

impl<S, D> MonitorBuilder<S, D> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<SpoolMonitor> {
        let scale = self
            .scale
            .ok_or_else(|| eyre::Report::new(BuildError::MissingScale))?;
        let display = self
            .display
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDisplay))?;
        validate_and_build(scale, display, self.parts)
    }

    pub fn with_levels(mut self, levels: SelectorLevels) -> Self {
        self.parts.levels = Some(levels);
        self
    }
    pub fn with_tares(mut self, tares: RollTares) -> Self {
        self.parts.tares = Some(tares);
        self
    }
    pub fn with_filter(mut self, filter: MeasurementFilter) -> Self {
        self.parts.filter = Some(filter);
        self
    }
    pub fn with_display_cfg(mut self, cfg: DisplayCfg) -> Self {
        self.parts.display = Some(cfg);
        self
    }
    pub fn with_debounce(mut self, cfg: DebounceCfg) -> Self {
        self.parts.debounce = Some(cfg);
        self
    }
    pub fn with_advance_button(mut self, pin: impl InputPin + 'static) -> Self {
        self.parts.advance_button = Some(Box::new(pin));
        self
    }
    pub fn with_unit_button(mut self, pin: impl InputPin + 'static) -> Self {
        self.parts.unit_button = Some(Box::new(pin));
        self
    }
    /// Output driven high for the duration of every scale read.
    pub fn with_reading_led(mut self, pin: impl OutputPin + 'static) -> Self {
        self.parts.reading_led = Some(Box::new(pin));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.parts.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<D> MonitorBuilder<Missing, D> {
    pub fn with_scale(self, scale: impl Scale + 'static) -> MonitorBuilder<Set, D> {
        MonitorBuilder {
            scale: Some(Box::new(scale)),
            display: self.display,
            parts: self.parts,
            _s: PhantomData,
            _d: PhantomData,
        }
    }
}

impl<S> MonitorBuilder<S, Missing> {
    pub fn with_display(self, display: impl Display + 'static) -> MonitorBuilder<S, Set> {
        MonitorBuilder {
            scale: self.scale,
            display: Some(Box::new(display)),
            parts: self.parts,
            _s: PhantomData,
            _d: PhantomData,
        }
    }
}

impl MonitorBuilder<Set, Set> {
    /// Validate and build. Only available when Scale and Display are set.
    pub fn build(self) -> Result<SpoolMonitor> {
        self.try_build()
    }
}

/// Build a statically-dispatched `Monitor` from concrete collaborators.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_monitor<S, D>(scale: S, display: D, parts: Parts) -> Result<Monitor<S, D>>
where
    S: Scale,
    D: Display,
{
    validate_and_build(scale, display, parts)
}
