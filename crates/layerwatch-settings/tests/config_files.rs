use layerwatch_gcode::StrokePolicy;
use layerwatch_settings::{Config, ConfigError, SettingsError};
use layerwatch_vision::{Milestone, SelectionStrategy};
use std::path::PathBuf;
use tempfile::TempDir;

fn sample() -> Config {
    let mut config = Config::new();
    config.render.stroke = StrokePolicy::Line;
    config.render.scale_px_per_mm = 4.0;
    config.layers.layer_height = 0.28;
    config.milestones.strategy = SelectionStrategy::PreferLayer;
    config.milestones.entries = vec![
        Milestone::new(10.0, "imgs/bkgnd_12.jpg"),
        Milestone::new(20.0, "imgs/bkgnd_24.jpg"),
    ];
    config.detection.roi = vec![(12, 40), (600, 40), (600, 470), (12, 470)];
    config.printer.host = "voron.local".to_string();
    config.output.live_photo = Some(PathBuf::from("/tmp/cam.jpg"));
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = sample();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let config = sample();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[detection]\ncanny_low = 80.0\ncanny_high = 20.0\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidSetting { .. }));
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = Config::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(missing, SettingsError::LoadError { .. }));

    let yaml = dir.path().join("config.yaml");
    std::fs::write(&yaml, "render: {}\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&yaml).unwrap_err(),
        SettingsError::Config(ConfigError::UnsupportedFormat(_))
    ));

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[render\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&broken).unwrap_err(),
        SettingsError::TomlError(_)
    ));
}
