//! Scale, display and input implementations for the spool monitor.
//!
//! Simulated devices are always available and are what the CLI uses unless
//! the `hardware` feature is enabled; the Raspberry Pi backends (HX711 load
//! cell and GPIO selector/button pins) live behind that feature.
pub mod error;
#[cfg(feature = "hardware")]
pub mod hx711;
pub mod util;

use spool_traits::{Display, InputPin, OutputPin, Scale};
use std::cell::{Cell, RefCell};
use std::io::Write;

use crate::error::HwError;
use std::rc::Rc;

/// Simulated load cell: a spool that loses `draw_per_read` grams every read,
/// with optional periodic upward spikes mimicking extruder pull-back tension.
pub struct SimulatedScale {
    weight: Rc<Cell<f32>>,
    draw_per_read: Rc<Cell<f32>>,
    spike_every: u32,
    spike_g: f32,
    reads: u32,
}

/// Shared handle to steer a `SimulatedScale` after it has been moved into
/// the monitor.
#[derive(Clone)]
pub struct ScaleHandle {
    weight: Rc<Cell<f32>>,
    draw_per_read: Rc<Cell<f32>>,
}

impl ScaleHandle {
    pub fn set_weight(&self, grams: f32) {
        self.weight.set(grams);
    }
    pub fn weight(&self) -> f32 {
        self.weight.get()
    }
    /// Remove `grams` from the spool in one go.
    pub fn consume(&self, grams: f32) {
        self.weight.set(self.weight.get() - grams);
    }
    pub fn set_draw_per_read(&self, grams: f32) {
        self.draw_per_read.set(grams);
    }
}

impl SimulatedScale {
    pub fn new(initial_g: f32) -> Self {
        SimulatedScale {
            weight: Rc::new(Cell::new(initial_g)),
            draw_per_read: Rc::new(Cell::new(0.0)),
            spike_every: 0,
            spike_g: 0.0,
            reads: 0,
        }
    }

    pub fn with_draw_per_read(self, grams: f32) -> Self {
        self.draw_per_read.set(grams);
        self
    }

    /// Every `every` reads, report `spike_g` more than the true weight.
    pub fn with_tension_spikes(mut self, every: u32, spike_g: f32) -> Self {
        self.spike_every = every;
        self.spike_g = spike_g;
        self
    }

    pub fn handle(&self) -> ScaleHandle {
        ScaleHandle {
            weight: self.weight.clone(),
            draw_per_read: self.draw_per_read.clone(),
        }
    }
}

impl Scale for SimulatedScale {
    fn read_weight(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        self.reads = self.reads.wrapping_add(1);
        let w = self.weight.get();
        self.weight.set(w - self.draw_per_read.get());
        let spike = if self.spike_every > 0 && self.reads % self.spike_every == 0 {
            self.spike_g
        } else {
            0.0
        };
        tracing::trace!(grams = w + spike, "simulated scale read");
        Ok(w + spike)
    }
}

/// Display that keeps every frame it was asked to show.
#[derive(Default)]
pub struct SimulatedDisplay {
    frames: Rc<RefCell<Vec<(String, String)>>>,
    clears: Rc<Cell<u32>>,
}

/// Read side of a `SimulatedDisplay`.
#[derive(Clone)]
pub struct DisplayHandle {
    frames: Rc<RefCell<Vec<(String, String)>>>,
    clears: Rc<Cell<u32>>,
}

impl DisplayHandle {
    /// Most recent (top, bottom) pair, if anything was drawn.
    pub fn last(&self) -> Option<(String, String)> {
        self.frames.borrow().last().cloned()
    }
    pub fn frame_count(&self) -> usize {
        self.frames.borrow().len()
    }
    pub fn clear_count(&self) -> u32 {
        self.clears.get()
    }
}

impl SimulatedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> DisplayHandle {
        DisplayHandle {
            frames: self.frames.clone(),
            clears: self.clears.clone(),
        }
    }
}

impl Display for SimulatedDisplay {
    fn show(
        &mut self,
        top: &str,
        bottom: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.frames
            .borrow_mut()
            .push((top.to_string(), bottom.to_string()));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.clears.set(self.clears.get().saturating_add(1));
        Ok(())
    }
}

/// Display that prints each frame to stdout inside a fixed-width box.
/// Write failures (e.g. a closed pipe) surface as `HwError::Display`.
pub struct ConsoleDisplay {
    columns: usize,
}

impl ConsoleDisplay {
    pub fn new(columns: usize) -> Self {
        Self { columns }
    }
}

impl Display for ConsoleDisplay {
    fn show(
        &mut self,
        top: &str,
        bottom: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let w = self.columns;
        let mut out = std::io::stdout().lock();
        writeln!(out, "|{top:<w$}|\n|{bottom:<w$}|\n+{}+", "-".repeat(w))
            .map_err(|e| HwError::Display(e.to_string()))?;
        Ok(())
    }
}

/// Pin whose level is shared with a `PinHandle`. As an input the handle
/// drives it; as an output the handle observes it.
#[derive(Default)]
pub struct SimulatedPin {
    level: Rc<Cell<bool>>,
}

#[derive(Clone)]
pub struct PinHandle {
    level: Rc<Cell<bool>>,
}

impl PinHandle {
    pub fn set(&self, high: bool) {
        self.level.set(high);
    }
    pub fn is_high(&self) -> bool {
        self.level.get()
    }
}

impl SimulatedPin {
    pub fn new(high: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(high)),
        }
    }
    pub fn handle(&self) -> PinHandle {
        PinHandle {
            level: self.level.clone(),
        }
    }
}

impl InputPin for SimulatedPin {
    fn is_high(&mut self) -> bool {
        self.level.get()
    }
}

impl OutputPin for SimulatedPin {
    fn set_high(&mut self) {
        self.level.set(true);
    }
    fn set_low(&mut self) {
        self.level.set(false);
    }
}

/// Button scripted to be pressed at given poll indices.
///
/// Each press is held high for `hold_polls` polls. Before every press the
/// input stays low for at least `lead_polls` polls (counted from the first
/// poll or from the end of the previous press), so a press requested too
/// early or too close to the previous one starts later instead of being
/// swallowed by the debouncer.
pub struct ScriptedPin {
    windows: Vec<(u64, u64)>,
    polls: u64,
}

impl ScriptedPin {
    pub fn new(mut starts: Vec<u64>, lead_polls: u64, hold_polls: u64) -> Self {
        starts.sort_unstable();
        starts.dedup();
        let hold = hold_polls.max(1);
        let mut free_from = 0u64;
        let windows = starts
            .into_iter()
            .map(|requested| {
                let start = requested.max(free_from.saturating_add(lead_polls));
                free_from = start.saturating_add(hold);
                (start, free_from)
            })
            .collect();
        Self { windows, polls: 0 }
    }

    /// Poll index at which each press actually goes high.
    pub fn press_starts(&self) -> impl Iterator<Item = u64> + '_ {
        self.windows.iter().map(|&(start, _)| start)
    }
}

impl InputPin for ScriptedPin {
    fn is_high(&mut self) -> bool {
        let n = self.polls;
        self.polls = self.polls.saturating_add(1);
        self.windows.iter().any(|&(start, end)| n >= start && n < end)
    }
}

#[cfg(feature = "hardware")]
pub mod hardware {
    use std::time::Duration;

    use rppal::gpio::Gpio;
    use spool_traits::{InputPin, OutputPin, Scale};

    use crate::error::HwError;
    use crate::hx711::Hx711;
    use crate::util::counts_to_grams;

    fn gpio_err(e: rppal::gpio::Error) -> HwError {
        HwError::Gpio(e.to_string())
    }

    /// HX711-backed scale. Tares once at construction, then reports grams
    /// averaged over `samples` conversions per read.
    pub struct HardwareScale {
        hx711: Hx711,
        samples: usize,
        counts_per_gram: f32,
        tare_counts: f64,
        timeout: Duration,
    }

    impl HardwareScale {
        pub fn try_new(
            dt_pin: u8,
            sck_pin: u8,
            samples: usize,
            counts_per_gram: f32,
            timeout: Duration,
        ) -> Result<Self, HwError> {
            let gpio = Gpio::new().map_err(gpio_err)?;
            let dt = gpio.get(dt_pin).map_err(gpio_err)?.into_input();
            let sck = gpio.get(sck_pin).map_err(gpio_err)?.into_output();
            // 25 pulses: channel A, gain 128
            let mut hx711 = Hx711::new(dt, sck, 25)?;
            let samples = samples.max(1);
            let tare_counts = hx711.read_average(samples, timeout)?;
            tracing::info!(tare_counts, samples, "scale tared");
            Ok(Self {
                hx711,
                samples,
                counts_per_gram,
                tare_counts,
                timeout,
            })
        }
    }

    impl Scale for HardwareScale {
        fn read_weight(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
            let mut attempts = 0;
            let max_attempts = 3;
            loop {
                match self.hx711.read_average(self.samples, self.timeout) {
                    Ok(avg) => {
                        let grams = counts_to_grams(avg, self.tare_counts, self.counts_per_gram);
                        tracing::trace!(avg, grams, "hx711 averaged sample");
                        return Ok(grams);
                    }
                    Err(HwError::DataReadyTimeout) if attempts < max_attempts => {
                        attempts += 1;
                        tracing::warn!(retries = attempts, "scale timeout, retrying");
                    }
                    Err(e) => {
                        tracing::error!("Scale read error: {}", e);
                        return Err(Box::new(e));
                    }
                }
            }
        }
    }

    /// GPIO input with optional inversion for pull-up wiring.
    pub struct GpioInput {
        pin: rppal::gpio::InputPin,
        active_low: bool,
    }

    impl GpioInput {
        pub fn try_new(pin: u8, active_low: bool) -> Result<Self, HwError> {
            let gpio = Gpio::new().map_err(gpio_err)?;
            let pin = if active_low {
                gpio.get(pin).map_err(gpio_err)?.into_input_pullup()
            } else {
                gpio.get(pin).map_err(gpio_err)?.into_input_pulldown()
            };
            Ok(Self { pin, active_low })
        }
    }

    impl InputPin for GpioInput {
        fn is_high(&mut self) -> bool {
            self.pin.is_high() != self.active_low
        }
    }

    /// Push-pull GPIO output, e.g. the reading LED. Starts low.
    pub struct GpioOutput {
        pin: rppal::gpio::OutputPin,
    }

    impl GpioOutput {
        pub fn try_new(pin: u8) -> Result<Self, HwError> {
            let gpio = Gpio::new().map_err(gpio_err)?;
            let pin = gpio.get(pin).map_err(gpio_err)?.into_output_low();
            Ok(Self { pin })
        }
    }

    impl OutputPin for GpioOutput {
        fn set_high(&mut self) {
            self.pin.set_high();
        }
        fn set_low(&mut self) {
            self.pin.set_low();
        }
    }

    /// Read the three static selector pins once. Selector pins are plain
    /// binary switches to ground/3V3, so the level is taken as-is.
    pub fn read_selector_levels(
        material: u8,
        diameter: u8,
        roll_weight: u8,
    ) -> Result<(u8, u8, u8), HwError> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        let level = |pin: u8| -> Result<u8, HwError> {
            let p = gpio.get(pin).map_err(gpio_err)?.into_input();
            Ok(u8::from(p.is_high()))
        };
        Ok((level(material)?, level(diameter)?, level(roll_weight)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_scale_draws_filament() {
        let mut scale = SimulatedScale::new(500.0).with_draw_per_read(2.0);
        let w1 = scale.read_weight().unwrap();
        let w2 = scale.read_weight().unwrap();
        assert_eq!(w1, 500.0);
        assert_eq!(w2, 498.0);
    }

    #[test]
    fn tension_spike_is_reported_on_schedule() {
        let mut scale = SimulatedScale::new(100.0).with_tension_spikes(2, 80.0);
        assert_eq!(scale.read_weight().unwrap(), 100.0);
        assert_eq!(scale.read_weight().unwrap(), 180.0);
        assert_eq!(scale.read_weight().unwrap(), 100.0);
    }

    #[test]
    fn scale_handle_steers_weight() {
        let mut scale = SimulatedScale::new(300.0);
        let h = scale.handle();
        h.consume(25.0);
        assert_eq!(scale.read_weight().unwrap(), 275.0);
        h.set_weight(10.0);
        assert_eq!(h.weight(), 10.0);
    }

    #[test]
    fn draw_rate_can_change_mid_run() {
        let mut scale = SimulatedScale::new(200.0);
        let h = scale.handle();
        assert_eq!(scale.read_weight().unwrap(), 200.0);
        h.set_draw_per_read(5.0);
        assert_eq!(scale.read_weight().unwrap(), 200.0);
        assert_eq!(scale.read_weight().unwrap(), 195.0);
        assert_eq!(h.weight(), 190.0);
    }

    #[test]
    fn simulated_pin_shares_level_with_handle() {
        let mut pin = SimulatedPin::new(false);
        let h = pin.handle();
        assert!(!pin.is_high());
        h.set(true);
        assert!(pin.is_high());

        let mut led = SimulatedPin::default();
        let watch = led.handle();
        led.set_high();
        assert!(watch.is_high());
        led.set_low();
        assert!(!watch.is_high());
    }

    #[test]
    fn simulated_display_records_frames() {
        let mut d = SimulatedDisplay::new();
        let h = d.handle();
        d.show("top", "bottom").unwrap();
        d.clear().unwrap();
        assert_eq!(h.last(), Some(("top".into(), "bottom".into())));
        assert_eq!(h.frame_count(), 1);
        assert_eq!(h.clear_count(), 1);
    }

    #[test]
    fn scripted_pin_holds_for_window() {
        let mut pin = ScriptedPin::new(vec![2], 0, 2);
        let levels: Vec<bool> = (0..5).map(|_| pin.is_high()).collect();
        assert_eq!(levels, vec![false, false, true, true, false]);
    }

    #[test]
    fn early_and_crowded_presses_are_pushed_back() {
        // lead 3, hold 3: first press cannot start before poll 3, the next
        // one not before 3 + 3 + 3.
        let pin = ScriptedPin::new(vec![6, 0], 3, 3);
        assert_eq!(pin.press_starts().collect::<Vec<_>>(), vec![3, 9]);

        let pin = ScriptedPin::new(vec![3, 10, 20], 3, 3);
        assert_eq!(pin.press_starts().collect::<Vec<_>>(), vec![3, 10, 20]);
    }

    #[test]
    fn duplicate_indices_are_one_press() {
        let mut pin = ScriptedPin::new(vec![4, 4], 0, 1);
        let highs = (0..10).filter(|_| pin.is_high()).count();
        assert_eq!(highs, 1);
    }
}
