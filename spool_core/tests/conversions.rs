use std::time::Duration;

use spool_core::{
    DebounceCfg, DisplayCfg, MeasurementFilter, MonitorError, RollTares, RunParams,
    SelectorLevels,
};

const TOML: &str = r#"
[pins]
scale_dt = 5
scale_sck = 6
material = 17
diameter = 27
roll_weight = 22
advance_button = 23
unit_button = 24

[roll]
tare_1kg_g = 230.0
tare_2kg_g = 310.0

[filter]
tension_threshold_g = 40.0

[display]
columns = 20
resolution_g = 0.5

[buttons]
press_ms = 30
release_ms = 80

[runner]
poll_ms = 250

[selectors]
material = 1
diameter = 0
roll_weight = 1
"#;

#[test]
fn config_sections_map_to_runtime_types() {
    let cfg = spool_config::load_toml(TOML).expect("parse");
    cfg.validate().expect("valid");

    let tares = RollTares::from(&cfg.roll);
    assert_eq!((tares.one_kg_g, tares.two_kg_g), (230.0, 310.0));

    let filter = MeasurementFilter::from(&cfg.filter);
    assert_eq!(filter.tension_threshold_g(), 40.0);

    let display = DisplayCfg::from(&cfg.display);
    assert_eq!(display.columns, 20);
    assert_eq!(display.resolution_g, 0.5);

    let debounce = DebounceCfg::from(&cfg.buttons);
    assert_eq!(debounce.press, Duration::from_millis(30));
    assert_eq!(debounce.release, Duration::from_millis(80));

    let run = RunParams::from(&cfg.runner);
    assert_eq!(run.poll_ms, 250);
    assert_eq!(run.max_iterations, None);

    let sel = cfg.selectors.as_ref().expect("selectors present");
    let levels = SelectorLevels::try_from(sel).expect("valid levels");
    assert!(levels.material && !levels.diameter && levels.roll_weight);
}

#[test]
fn out_of_range_selector_level_is_a_config_error() {
    let sel = spool_config::Selectors {
        material: 0,
        diameter: 3,
        roll_weight: 0,
    };
    let err = SelectorLevels::try_from(&sel).expect_err("3 is not a level");
    assert!(matches!(
        err.downcast_ref::<MonitorError>(),
        Some(MonitorError::Config(_))
    ));
}
