//! Settings file round trips and migration from older layouts

use chrono::Utc;
use std::fs;
use tempfile::tempdir;
use tv_visual_check::calibration::{find_preset, MAX_CORRECTION_FACTOR};
use tv_visual_check::settings::{LoadSource, Settings, SettingsError, UiMode, SCHEMA_VERSION};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let loaded = Settings::load(&dir.path().join("absent.json")).unwrap();
    assert_eq!(loaded.source, LoadSource::Defaults);
    assert_eq!(loaded.settings, Settings::default());
}

#[test]
fn saved_settings_load_back_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = Settings::default();
    settings
        .calibration
        .apply_preset(find_preset("55\" 4k").expect("preset exists"));
    settings.calibration.set_correction_factor(5.0);
    settings.calibration.complete_calibration();
    settings.ui_mode_override = Some(UiMode::Tv);
    settings.record_test(Utc::now());
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded.source, LoadSource::Current);
    assert_eq!(loaded.settings, settings);
    assert_eq!(loaded.settings.calibration.correction_factor, MAX_CORRECTION_FACTOR);
    assert_eq!(loaded.settings.calibration.px_per_mm, 3.1);
}

#[test]
fn version_one_file_is_migrated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "calibration": {
                "distance_m": 2.5,
                "px_per_mm": 4.2,
                "aspect_ratio": "16:10",
                "correction_factor": 0.95,
                "calibrated": true
            },
            "ui_mode_override": "desktop",
            "legacy_flag": true
        }"#,
    )
    .unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded.source, LoadSource::Migrated { from: 1 });

    let s = loaded.settings;
    assert_eq!(s.schema_version, SCHEMA_VERSION);
    assert_eq!(s.calibration.distance_m, 2.5);
    assert_eq!(s.calibration.px_per_mm, 4.2);
    assert_eq!(s.calibration.aspect_ratio, "16:10");
    assert_eq!(s.calibration.correction_factor, 1.0);
    assert!(s.calibration.calibrated);
    assert_eq!(s.ui_mode_override, Some(UiMode::Desktop));
    assert_eq!(s.test_count, 0);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    match Settings::load(&path) {
        Err(SettingsError::Parse { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected parse error, got {:?}", other.map(|l| l.source)),
    }
}

#[test]
fn reset_then_save_keeps_override() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut settings = Settings::default();
    settings.calibration.complete_calibration();
    settings.ui_mode_override = Some(UiMode::Touch);
    settings.reset();
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap().settings;
    assert!(!loaded.calibration.calibrated);
    assert_eq!(loaded.ui_mode_override, Some(UiMode::Touch));
}
