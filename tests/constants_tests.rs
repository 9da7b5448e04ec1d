// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use photo_booth::constants::{CountdownSetting, capture, library, messages};

#[test]
fn test_countdown_setting_values() {
    // Off, 3s, 5s, 10s
    assert_eq!(CountdownSetting::ALL.len(), 4);
    assert_eq!(CountdownSetting::default().seconds(), 5);
}

#[test]
fn test_countdown_settings_ordered() {
    let mut prev = None;
    for setting in CountdownSetting::ALL {
        if let Some(prev) = prev {
            assert!(setting.seconds() > prev, "Presets should be ordered from shortest to longest");
        }
        prev = Some(setting.seconds());
    }
}

#[test]
fn test_capture_limits() {
    assert_eq!(library::CAPACITY, 50);
    assert_eq!(capture::JPEG_QUALITY, 80);
    assert!(capture::FLASH_AT_SECONDS < CountdownSetting::default().seconds());
}

#[test]
fn test_filter_messages() {
    assert_eq!(messages::applying_filter("sepia"), "Applying sepia filter...");
    assert_eq!(messages::filter_applied("Sepia"), "Sepia filter applied");
}
