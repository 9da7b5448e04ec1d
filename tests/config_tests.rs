// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use photo_booth::Config;
use photo_booth::filters::FilterKind;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(
        config.mirror_preview,
        "Mirror preview should be enabled by default"
    );
    assert_eq!(config.default_filter, FilterKind::None);
    assert_eq!(config.countdown_seconds, 5);
    assert_eq!(
        (config.preview_max_width, config.preview_max_height),
        (600, 400)
    );
}

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        mirror_preview: false,
        last_camera_path: Some("/dev/video2".to_string()),
        default_filter: FilterKind::Sepia,
        countdown_seconds: 3,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path), config);
    assert!(
        !path.with_extension("json.tmp").exists(),
        "Temporary file should be renamed away"
    );
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_filter_stored_lowercase() {
    let config = Config {
        default_filter: FilterKind::Grayscale,
        ..Config::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""default_filter":"grayscale""#));
}
