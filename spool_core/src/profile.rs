//! Filament profile and roll class resolution from the static selector pins.
//!
//! The per-material constants are measured values (length per gram and
//! weight per centimetre for each material × diameter pair). They are kept
//! as a fixed table and looked up, never derived from density at runtime.

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Pla,
    Abs,
}

impl Material {
    /// Selector pin: low = PLA, high = ABS.
    pub fn from_pin(high: bool) -> Self {
        if high { Self::Abs } else { Self::Pla }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pla => "PLA",
            Self::Abs => "ABS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diameter {
    Mm175,
    Mm300,
}

impl Diameter {
    /// Selector pin: low = 1.75 mm, high = 3.00 mm.
    pub fn from_pin(high: bool) -> Self {
        if high { Self::Mm300 } else { Self::Mm175 }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mm175 => "1.75 mm",
            Self::Mm300 => "3.00 mm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollWeight {
    OneKg,
    TwoKg,
}

impl RollWeight {
    /// Selector pin: low = 1 kg roll, high = 2 kg roll.
    pub fn from_pin(high: bool) -> Self {
        if high { Self::TwoKg } else { Self::OneKg }
    }

    pub fn nominal_g(self) -> f32 {
        match self {
            Self::OneKg => 1000.0,
            Self::TwoKg => 2000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneKg => "1Kg",
            Self::TwoKg => "2Kg",
        }
    }
}

/// Conversion constants for one material × diameter combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilamentProfile {
    pub material: Material,
    pub diameter: Diameter,
    pub grams_per_cm: f32,
    pub cm_per_gram: f32,
}

// Indexed by `material * 2 + diameter`. ABS 3.00 mm uses its own 0.076 g/cm;
// older firmware reused the 1.75 mm weight-per-length value there.
const PROFILES: [FilamentProfile; 4] = [
    FilamentProfile {
        material: Material::Pla,
        diameter: Diameter::Mm175,
        grams_per_cm: 0.03,
        cm_per_gram: 33.0,
    },
    FilamentProfile {
        material: Material::Pla,
        diameter: Diameter::Mm300,
        grams_per_cm: 0.09,
        cm_per_gram: 11.0,
    },
    FilamentProfile {
        material: Material::Abs,
        diameter: Diameter::Mm175,
        grams_per_cm: 0.025,
        cm_per_gram: 40.0,
    },
    FilamentProfile {
        material: Material::Abs,
        diameter: Diameter::Mm300,
        grams_per_cm: 0.076,
        cm_per_gram: 13.0,
    },
];

impl FilamentProfile {
    pub fn lookup(material: Material, diameter: Diameter) -> Self {
        let m = match material {
            Material::Pla => 0,
            Material::Abs => 1,
        };
        let d = match diameter {
            Diameter::Mm175 => 0,
            Diameter::Mm300 => 1,
        };
        PROFILES[m * 2 + d]
    }

    /// All tabulated profiles, in table order.
    pub fn all() -> &'static [FilamentProfile] {
        &PROFILES
    }

    /// e.g. `PLA 1.75 mm`
    pub fn summary(&self) -> String {
        format!("{} {}", self.material.label(), self.diameter.label())
    }
}

/// Empty spool weights per roll class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollTares {
    pub one_kg_g: f32,
    pub two_kg_g: f32,
}

impl Default for RollTares {
    fn default() -> Self {
        Self {
            one_kg_g: 240.0,
            two_kg_g: 250.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollClass {
    pub weight: RollWeight,
    pub nominal_g: f32,
    pub tare_g: f32,
}

impl RollClass {
    pub fn new(weight: RollWeight, tares: &RollTares) -> Self {
        let tare_g = match weight {
            RollWeight::OneKg => tares.one_kg_g,
            RollWeight::TwoKg => tares.two_kg_g,
        };
        Self {
            weight,
            nominal_g: weight.nominal_g(),
            tare_g,
        }
    }

    pub fn label(&self) -> &'static str {
        self.weight.label()
    }
}

/// Levels of the three selector pins, sampled once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorLevels {
    pub material: bool,
    pub diameter: bool,
    pub roll_weight: bool,
}

impl SelectorLevels {
    /// Build from numeric pin levels; anything other than 0 or 1 is a fatal
    /// configuration error.
    pub fn from_levels(material: u8, diameter: u8, roll_weight: u8) -> Result<Self> {
        let bit = |name: &str, v: u8| -> Result<bool> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(eyre::Report::new(MonitorError::Config(format!(
                    "{name} selector level {other} is not 0 or 1"
                )))),
            }
        };
        Ok(Self {
            material: bit("material", material)?,
            diameter: bit("diameter", diameter)?,
            roll_weight: bit("roll_weight", roll_weight)?,
        })
    }
}

/// Outcome of resolving the selector pins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub profile: FilamentProfile,
    pub roll: RollClass,
}

impl Resolved {
    /// One-line description, e.g. `PLA 1.75 mm 1Kg`.
    pub fn summary(&self) -> String {
        format!("{} {}", self.profile.summary(), self.roll.label())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileResolver {
    tares: RollTares,
}

impl ProfileResolver {
    pub fn new(tares: RollTares) -> Result<Self> {
        let check = |name: &str, tare: f32, nominal: f32| -> Result<()> {
            if !tare.is_finite() || tare < 0.0 || tare >= nominal {
                return Err(eyre::Report::new(MonitorError::Config(format!(
                    "{name} tare {tare} g must be in [0, {nominal})"
                ))));
            }
            Ok(())
        };
        check("1Kg", tares.one_kg_g, RollWeight::OneKg.nominal_g())?;
        check("2Kg", tares.two_kg_g, RollWeight::TwoKg.nominal_g())?;
        Ok(Self { tares })
    }

    pub fn resolve(&self, levels: SelectorLevels) -> Resolved {
        let profile = FilamentProfile::lookup(
            Material::from_pin(levels.material),
            Diameter::from_pin(levels.diameter),
        );
        let roll = RollClass::new(RollWeight::from_pin(levels.roll_weight), &self.tares);
        let resolved = Resolved { profile, roll };
        tracing::info!(
            profile = %resolved.summary(),
            cm_per_gram = profile.cm_per_gram,
            grams_per_cm = profile.grams_per_cm,
            tare_g = roll.tare_g,
            "filament profile resolved"
        );
        resolved
    }
}

/// Resolve with the default spool tares.
pub fn resolve(material_pin: bool, diameter_pin: bool, weight_pin: bool) -> (FilamentProfile, RollClass) {
    let profile = FilamentProfile::lookup(
        Material::from_pin(material_pin),
        Diameter::from_pin(diameter_pin),
    );
    let roll = RollClass::new(RollWeight::from_pin(weight_pin), &RollTares::default());
    (profile, roll)
}
