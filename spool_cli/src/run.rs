//! Monitor assembly (simulated or hardware backend) and subcommand bodies.

use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use spool_config::Config;
use spool_core::builder::{Missing, MonitorBuilder};
use spool_core::error::{MonitorError, Result};
use spool_core::{
    DebounceCfg, DisplayCfg, MeasurementFilter, ProfileResolver, RollTares, RunParams,
    SelectorLevels, SessionSnapshot, SpoolMonitor,
};
use spool_hardware::{ConsoleDisplay, ScriptedPin, SimulatedDisplay, SimulatedScale};
use spool_traits::Display;

/// Simulation knobs from `spool run`.
#[derive(Debug, Clone, Default)]
pub struct SimArgs {
    pub press_at: Vec<u64>,
    pub toggle_at: Vec<u64>,
    pub initial_g: f32,
    pub draw_g: f32,
    pub spike_every: Option<u32>,
    pub spike_g: f32,
}

/// Convert a config-load failure into a typed configuration error.
pub fn load_config(path: &std::path::Path) -> Result<Config> {
    spool_config::load_file(path)
        .map_err(|e| eyre::Report::new(MonitorError::Config(e.to_string())))
        .wrap_err_with(|| format!("loading {}", path.display()))
}

/// Builder with everything from the config file except the devices and
/// selector levels.
fn configured(cfg: &Config) -> MonitorBuilder<Missing, Missing> {
    SpoolMonitor::builder()
        .with_tares(RollTares::from(&cfg.roll))
        .with_filter(MeasurementFilter::from(&cfg.filter))
        .with_display_cfg(DisplayCfg::from(&cfg.display))
        .with_debounce(DebounceCfg::from(&cfg.buttons))
}

fn configured_levels(cfg: &Config) -> Result<SelectorLevels> {
    cfg.selectors
        .as_ref()
        .map_or(Ok(SelectorLevels::default()), SelectorLevels::try_from)
}

fn display_for(cfg: &Config, json: bool) -> Box<dyn Display> {
    if json {
        Box::new(SimulatedDisplay::new())
    } else {
        Box::new(ConsoleDisplay::new(cfg.display.columns))
    }
}

/// Polls a scripted press must stay high to pass the debouncer at `poll_ms`.
fn hold_polls(press_ms: u64, poll_ms: u64) -> u64 {
    press_ms.div_ceil(poll_ms.max(1)) + 1
}

/// Low polls the debouncer needs before it accepts the next press.
fn lead_polls(release_ms: u64, poll_ms: u64) -> u64 {
    release_ms.div_ceil(poll_ms.max(1)) + 1
}

fn scripted_button(button: &'static str, requested: &[u64], lead: u64, hold: u64) -> ScriptedPin {
    let pin = ScriptedPin::new(requested.to_vec(), lead, hold);
    let mut wanted = requested.to_vec();
    wanted.sort_unstable();
    wanted.dedup();
    for (want, start) in wanted.into_iter().zip(pin.press_starts()) {
        if start != want {
            tracing::warn!(
                button,
                requested = want,
                start,
                "scripted press moved later so the debouncer sees a release first"
            );
        }
    }
    pin
}

pub fn build_simulated(cfg: &Config, sim: &SimArgs, json: bool) -> Result<SpoolMonitor> {
    let mut scale = SimulatedScale::new(sim.initial_g).with_draw_per_read(sim.draw_g);
    if let Some(every) = sim.spike_every {
        scale = scale.with_tension_spikes(every, sim.spike_g);
    }
    let hold = hold_polls(cfg.buttons.press_ms, cfg.runner.poll_ms);
    let lead = lead_polls(cfg.buttons.release_ms, cfg.runner.poll_ms);
    tracing::info!(
        initial_g = sim.initial_g,
        draw_g = sim.draw_g,
        presses = sim.press_at.len(),
        toggles = sim.toggle_at.len(),
        "simulated backend"
    );
    configured(cfg)
        .with_levels(configured_levels(cfg)?)
        .with_advance_button(scripted_button("advance", &sim.press_at, lead, hold))
        .with_unit_button(scripted_button("unit", &sim.toggle_at, lead, hold))
        .with_scale(scale)
        .with_display(display_for(cfg, json))
        .build()
}

#[cfg(feature = "hardware")]
pub fn build_hardware(cfg: &Config, json: bool) -> Result<SpoolMonitor> {
    use spool_hardware::hardware::{GpioInput, GpioOutput, HardwareScale, read_selector_levels};
    use std::time::Duration;

    let p = &cfg.pins;
    let (m, d, w) = read_selector_levels(p.material, p.diameter, p.roll_weight)
        .map_err(eyre::Report::new)
        .wrap_err("read selector pins")?;
    let levels = SelectorLevels::from_levels(m, d, w)?;

    let scale = HardwareScale::try_new(
        p.scale_dt,
        p.scale_sck,
        cfg.scale.samples,
        cfg.scale.calibration_factor,
        Duration::from_millis(cfg.scale.read_timeout_ms),
    )
    .map_err(eyre::Report::new)
    .wrap_err("open hx711")?;
    let advance = GpioInput::try_new(p.advance_button, cfg.buttons.active_low)
        .map_err(eyre::Report::new)
        .wrap_err("open button pins")?;
    let unit = GpioInput::try_new(p.unit_button, cfg.buttons.active_low)
        .map_err(eyre::Report::new)
        .wrap_err("open button pins")?;

    let mut builder = configured(cfg)
        .with_levels(levels)
        .with_advance_button(advance)
        .with_unit_button(unit);
    if let Some(led) = p.reading_led {
        let led = GpioOutput::try_new(led)
            .map_err(eyre::Report::new)
            .wrap_err("open reading LED pin")?;
        builder = builder.with_reading_led(led);
    }
    builder
        .with_scale(scale)
        .with_display(display_for(cfg, json))
        .build()
}

/// Build against the backend this binary was compiled for.
pub fn build_monitor(cfg: &Config, sim: &SimArgs, json: bool) -> Result<SpoolMonitor> {
    #[cfg(feature = "hardware")]
    {
        let _ = sim;
        build_hardware(cfg, json)
    }
    #[cfg(not(feature = "hardware"))]
    {
        build_simulated(cfg, sim, json)
    }
}

pub fn run_monitor(
    cfg: &Config,
    sim: &SimArgs,
    iterations: Option<u64>,
    json: bool,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut monitor = build_monitor(cfg, sim, json)?;
    let params = RunParams {
        max_iterations: iterations,
        ..RunParams::from(&cfg.runner)
    };
    let snap = spool_core::run(&mut monitor, params, shutdown)?;
    print_snapshot(&snap, json);
    Ok(())
}

pub fn snapshot_json(s: &SessionSnapshot) -> serde_json::Value {
    serde_json::json!({
        "status": format!("{:?}", s.status),
        "unit": s.unit.suffix(),
        "iterations": s.iterations,
        "initial_g": s.initial_g,
        "remaining_g": s.readout.remaining_g,
        "remaining_percent": s.readout.remaining_percent,
        "remaining_m": s.readout.remaining_m,
        "consumed_g": s.readout.consumed_g,
        "consumed_cm": s.readout.consumed_cm,
        "top": s.lines.top,
        "bottom": s.lines.bottom,
    })
}

fn print_snapshot(s: &SessionSnapshot, json: bool) {
    if json {
        println!("{}", snapshot_json(s));
        return;
    }
    println!("status: {:?} after {} iterations", s.status, s.iterations);
    println!("display: {} | {}", s.lines.top, s.lines.bottom);
    println!(
        "remaining: {:.1} g ({:.0}%), consumed: {:.1} g / {:.0} cm",
        s.readout.remaining_g, s.readout.remaining_percent, s.readout.consumed_g, s.readout.consumed_cm
    );
}

pub fn print_profile(
    cfg: &Config,
    material: Option<u8>,
    diameter: Option<u8>,
    roll_weight: Option<u8>,
    json: bool,
) -> Result<()> {
    let base = cfg.selectors.as_ref();
    let levels = SelectorLevels::from_levels(
        material.or(base.map(|s| s.material)).unwrap_or(0),
        diameter.or(base.map(|s| s.diameter)).unwrap_or(0),
        roll_weight.or(base.map(|s| s.roll_weight)).unwrap_or(0),
    )?;
    let resolved = ProfileResolver::new(RollTares::from(&cfg.roll))?.resolve(levels);
    let p = resolved.profile;
    let r = resolved.roll;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "summary": resolved.summary(),
                "material": p.material.label(),
                "diameter": p.diameter.label(),
                "cm_per_gram": p.cm_per_gram,
                "grams_per_cm": p.grams_per_cm,
                "nominal_g": r.nominal_g,
                "tare_g": r.tare_g,
            })
        );
    } else {
        println!("{}", resolved.summary());
        println!("  {} cm/g, {} g/cm", p.cm_per_gram, p.grams_per_cm);
        println!("  roll {} g, spool tare {} g", r.nominal_g, r.tare_g);
    }
    Ok(())
}

pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    // quiet display: only the check result goes to stdout
    let mut monitor = build_monitor(cfg, &SimArgs::default(), true)?;
    let report = monitor.step().wrap_err("self-check step")?;
    tracing::info!(reading_g = report.reading_g, "self-check step ok");
    if json {
        println!(
            "{}",
            serde_json::json!({ "ok": true, "profile": monitor.resolved().summary(), "reading_g": report.reading_g })
        );
    } else {
        println!("ok: {} ({:.1} g)", monitor.resolved().summary(), report.reading_g);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_covers_the_press_interval() {
        assert_eq!(hold_polls(50, 100), 2);
        assert_eq!(hold_polls(20, 10), 3);
        assert_eq!(hold_polls(0, 10), 1);
        assert_eq!(hold_polls(50, 0), 51);
    }

    #[test]
    fn lead_covers_the_release_interval() {
        assert_eq!(lead_polls(20, 10), 3);
        assert_eq!(lead_polls(50, 100), 2);
    }

    #[test]
    fn crowded_script_keeps_every_press() {
        let pin = scripted_button("advance", &[6, 3, 0], 3, 3);
        assert_eq!(pin.press_starts().collect::<Vec<_>>(), vec![3, 9, 15]);
    }
}
