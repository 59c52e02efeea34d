#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the spool monitor.
//!
//! `Config` and its sections are deserialized from TOML and checked with
//! `Config::validate`. Every section except `[pins]` has defaults matching
//! the reference device, so a minimal file only needs the pin map.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub scale_dt: u8,
    pub scale_sck: u8,
    /// Selector: low = PLA, high = ABS
    pub material: u8,
    /// Selector: low = 1.75 mm, high = 3.00 mm
    pub diameter: u8,
    /// Selector: low = 1 kg roll, high = 2 kg roll
    pub roll_weight: u8,
    pub advance_button: u8,
    pub unit_button: u8,
    /// Output lit while the scale is sampling (optional)
    #[serde(default)]
    pub reading_led: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScaleCfg {
    /// Raw counts per gram (measured on the assembled device)
    pub calibration_factor: f32,
    /// Conversions averaged per reported reading
    pub samples: usize,
    /// Max time to wait for HX711 data-ready (DT low) before failing
    pub read_timeout_ms: u64,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            calibration_factor: 428.0,
            samples: 10,
            read_timeout_ms: 150,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RollCfg {
    /// Empty spool weight of a 1 kg roll (g)
    pub tare_1kg_g: f32,
    /// Empty spool weight of a 2 kg roll (g)
    pub tare_2kg_g: f32,
}

impl Default for RollCfg {
    fn default() -> Self {
        Self {
            tare_1kg_g: 240.0,
            // Not measured yet; adjust for the spools in use.
            tare_2kg_g: 250.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Increase in grams between two samples while printing that is treated
    /// as extruder pull-back rather than a real weight change.
    pub tension_threshold_g: f32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            tension_threshold_g: 50.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    pub columns: usize,
    /// Minimum weight change (g) that triggers a redraw
    pub resolution_g: f32,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            columns: 16,
            resolution_g: 0.15,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ButtonsCfg {
    /// Input must stay pressed this long to count
    pub press_ms: u64,
    /// Input must stay released this long before the next press is accepted
    pub release_ms: u64,
    /// Treat low level as pressed when true
    pub active_low: bool,
}

impl Default for ButtonsCfg {
    fn default() -> Self {
        Self {
            press_ms: 50,
            release_ms: 50,
            active_low: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Loop period in milliseconds
    pub poll_ms: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self { poll_ms: 100 }
    }
}

/// Fixed selector levels for running without GPIO (simulation, bench tests).
#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct Selectors {
    pub material: u8,
    pub diameter: u8,
    pub roll_weight: u8,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub scale: ScaleCfg,
    #[serde(default)]
    pub roll: RollCfg,
    #[serde(default)]
    pub filter: FilterCfg,
    #[serde(default)]
    pub display: DisplayCfg,
    #[serde(default)]
    pub buttons: ButtonsCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub logging: Logging,
    /// Levels used when the selector pins cannot be read.
    #[serde(default)]
    pub selectors: Option<Selectors>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file, then validate it.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration: {e}"))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        let p = &self.pins;
        let mut all = vec![
            ("scale_dt", p.scale_dt),
            ("scale_sck", p.scale_sck),
            ("material", p.material),
            ("diameter", p.diameter),
            ("roll_weight", p.roll_weight),
            ("advance_button", p.advance_button),
            ("unit_button", p.unit_button),
        ];
        if let Some(led) = p.reading_led {
            all.push(("reading_led", led));
        }
        for (i, (name_a, a)) in all.iter().enumerate() {
            for (name_b, b) in &all[i + 1..] {
                if a == b {
                    eyre::bail!("pins.{name_a} and pins.{name_b} share GPIO {a}");
                }
            }
        }

        // Scale
        if !self.scale.calibration_factor.is_finite() || self.scale.calibration_factor <= 0.0 {
            eyre::bail!("scale.calibration_factor must be > 0");
        }
        if self.scale.samples == 0 || self.scale.samples > 64 {
            eyre::bail!("scale.samples must be in [1, 64]");
        }
        if self.scale.read_timeout_ms == 0 {
            eyre::bail!("scale.read_timeout_ms must be >= 1");
        }

        // Roll tares
        if !self.roll.tare_1kg_g.is_finite() || !(0.0..1000.0).contains(&self.roll.tare_1kg_g) {
            eyre::bail!("roll.tare_1kg_g must be in [0, 1000)");
        }
        if !self.roll.tare_2kg_g.is_finite() || !(0.0..2000.0).contains(&self.roll.tare_2kg_g) {
            eyre::bail!("roll.tare_2kg_g must be in [0, 2000)");
        }

        // Filter
        if !self.filter.tension_threshold_g.is_finite() || self.filter.tension_threshold_g <= 0.0 {
            eyre::bail!("filter.tension_threshold_g must be > 0");
        }

        // Display
        if !(8..=40).contains(&self.display.columns) {
            eyre::bail!("display.columns must be in [8, 40]");
        }
        if !self.display.resolution_g.is_finite() || self.display.resolution_g < 0.0 {
            eyre::bail!("display.resolution_g must be >= 0");
        }

        // Buttons
        if self.buttons.press_ms > 5_000 || self.buttons.release_ms > 5_000 {
            eyre::bail!("buttons.press_ms/release_ms are unreasonably large (>5s)");
        }

        // Runner
        if self.runner.poll_ms == 0 {
            eyre::bail!("runner.poll_ms must be >= 1");
        }

        // Selectors
        if let Some(s) = &self.selectors
            && (s.material > 1 || s.diameter > 1 || s.roll_weight > 1)
        {
            eyre::bail!("selectors.* must be 0 or 1");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
