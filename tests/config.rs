use apollo_mcc::io::{ConfigRepr, MissionConfig};
use apollo_mcc::time::Unit;
use apollo_mcc::utils::hhmmss;
use std::path::PathBuf;

fn data(name: &str) -> PathBuf {
    PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or(".".to_string()))
        .join("data")
        .join(name)
}

#[test]
fn mission_f() {
    let cfg = MissionConfig::load(data("mission_f.yaml")).unwrap();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.name, "F");
    assert!((cfg.nominal_loi - hhmmss(75, 49, 40.2)).to_seconds().abs() < 1e-6);
    assert_eq!(cfg.nominal_ei, hhmmss(191, 50, 0.0));
    assert_eq!(cfg.recovery_area, "MIDPAC");
    assert!(cfg.pad_auto_show);
}

#[test]
fn named_missions() {
    let missions = MissionConfig::load_named(data("missions.yaml")).unwrap();
    assert_eq!(missions.len(), 2);
    let late = &missions["late-launch"];
    assert_eq!(late.nominal_loi, 76 * Unit::Hour);
    // Unspecified fields keep their defaults
    assert_eq!(late.entry_longitude_deg, -165.0);
    assert!(!missions["quiet"].pad_auto_show);
    assert!(missions.values().all(|cfg| cfg.validate().is_ok()));
}

#[test]
fn missing_file() {
    assert!(MissionConfig::load(data("does_not_exist.yaml")).is_err());
}
