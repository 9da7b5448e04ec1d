// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for booth operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking photos into the library
//! - Filtering image files
//! - Managing the photo library

use photo_booth::backends::camera::{
    DeviceSelector, SharedSource, StillImageSource, lock_source, share,
};
use photo_booth::config::Config;
use photo_booth::constants::timing;
use photo_booth::filters::{self, FilterKind};
use photo_booth::notify::TracingNotifier;
use photo_booth::pipelines::photo::PhotoCapture;
use photo_booth::render::{ManualScheduler, ThreadScheduler};
use photo_booth::{CountdownEvent, PhotoBooth};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Parse a `--camera` value: an index from `photo-booth list` or a device path
pub fn parse_selector(value: &str) -> Result<DeviceSelector, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("camera must be an index or a device path".to_string());
    }
    Ok(match value.parse::<usize>() {
        Ok(index) => DeviceSelector::Index(index),
        Err(_) => DeviceSelector::Path(value.to_string()),
    })
}

/// List all available cameras
pub fn list_cameras(source: SharedSource) -> Result<(), Box<dyn std::error::Error>> {
    let cameras = lock_source(&source).list_devices()?;

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Path: {}", camera.path);
        if let Some(driver) = &camera.driver {
            println!("      Driver: {}", driver);
        }
        println!();
    }

    Ok(())
}

/// Options for a single command-line capture
pub struct PhotoOptions {
    pub camera: Option<DeviceSelector>,
    pub filter: Option<FilterKind>,
    pub countdown: Option<u32>,
    pub output: Option<PathBuf>,
}

/// Take a photo, save it to the library and optionally export it
///
/// Returns the configuration to persist (last used camera).
pub fn take_photo(
    config: Config,
    source: SharedSource,
    options: PhotoOptions,
) -> Result<Config, Box<dyn std::error::Error>> {
    let countdown_setting = config.countdown_seconds;
    let mut run_config = config;
    if let Some(seconds) = options.countdown {
        run_config.countdown_seconds = seconds;
    }

    let store = run_config.library_store();
    let scheduler = ThreadScheduler::new("photo-render", timing::REFRESH_INTERVAL);
    let mut booth = PhotoBooth::new(
        run_config,
        source.clone(),
        scheduler,
        store,
        Box::new(TracingNotifier),
    );

    booth.start_preferred_camera(options.camera)?;
    if let Some(device) = booth.current_device() {
        println!("Using camera: {}", device.name);
    }
    if let Some(kind) = options.filter {
        booth.select_filter(kind)?;
    }

    // Wait for the camera to settle (exposure, white balance)
    PhotoCapture::capture_with_timeout(&source, timing::FIRST_FRAME_TIMEOUT)?;
    std::thread::sleep(timing::CAMERA_WARMUP);

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    if !booth.start_countdown() {
        return Err(if booth.is_streaming() {
            "Failed to capture photo".into()
        } else {
            "Camera is not streaming".into()
        });
    }

    if let Some(remaining) = booth.countdown_remaining() {
        println!("Capturing in... (press Ctrl+C to abort)");
        print!("{} ", remaining);
        std::io::stdout().flush()?;
    }

    while booth.countdown_remaining().is_some() {
        std::thread::sleep(timing::COUNTDOWN_STEP);
        if stop_flag.load(Ordering::SeqCst) {
            booth.cancel_countdown();
            println!();
            return Err("Capture aborted".into());
        }

        match booth.countdown_tick() {
            Some(CountdownEvent::Remaining(remaining)) => print!("{} ", remaining),
            Some(CountdownEvent::Flash) => print!("1 * "),
            Some(CountdownEvent::Captured) => println!(),
            Some(CountdownEvent::CaptureFailed) => {
                println!();
                return Err("Failed to capture photo".into());
            }
            None => {}
        }
        std::io::stdout().flush()?;
    }

    let Some(session) = booth.session() else {
        return Err("Failed to capture photo".into());
    };
    println!(
        "Captured {}x{} with {} filter",
        session.still().width,
        session.still().height,
        session.filter().display_name()
    );

    let id = booth.save_photo()?;
    println!("Photo saved to library: {}", id);

    if let Some(target) = options.output {
        let path = booth.export_photo(id, &target)?;
        println!("Photo exported: {}", path.display());
    }

    booth.shutdown();
    let mut config = booth.config().clone();
    config.countdown_seconds = countdown_setting;
    Ok(config)
}

/// Apply a filter to an image file
pub fn filter_file(
    input: &Path,
    kind: FilterKind,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::open(input)?.to_rgba8();
    let frame = photo_booth::backends::camera::CameraFrame::from_rgba_image(image);

    let filtered = filters::apply(&frame, kind)?;
    filtered.to_rgba_image()?.save(output)?;

    println!(
        "{} filter applied: {} -> {}",
        kind.display_name(),
        input.display(),
        output.display()
    );
    Ok(())
}

/// Print the photos in the library, newest first
pub fn gallery_list(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let library = config.library_store().load_all();

    if library.is_empty() {
        println!("No photos saved.");
        return Ok(());
    }

    println!("Saved photos ({}/{}):", library.len(), library.capacity());
    println!();
    for photo in library.photos() {
        println!(
            "  {}  {}  {:<9}  {:>7} bytes  {}",
            photo.id,
            photo.timestamp.format("%Y-%m-%d %H:%M:%S"),
            photo.filter.display_name(),
            photo.data.len(),
            photo.filename
        );
    }

    Ok(())
}

/// Delete a photo from the library
pub fn gallery_delete(config: Config, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut booth = library_booth(config);
    if booth.delete_photo(id)? {
        println!("Deleted photo {}", id);
        Ok(())
    } else {
        Err(format!("No photo with id {}", id).into())
    }
}

/// Write a photo from the library to a file or directory
pub fn gallery_export(
    config: Config,
    id: u64,
    target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let booth = library_booth(config);
    let path = booth.export_photo(id, target)?;
    println!("Photo exported: {}", path.display());
    Ok(())
}

/// A booth with no camera, for library maintenance
fn library_booth(config: Config) -> PhotoBooth {
    let store = config.library_store();
    PhotoBooth::new(
        config,
        share(StillImageSource::new()),
        ManualScheduler::new(),
        store,
        Box::new(TracingNotifier),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector() {
        assert_eq!(parse_selector("1"), Ok(DeviceSelector::Index(1)));
        assert_eq!(
            parse_selector("/dev/video2"),
            Ok(DeviceSelector::Path("/dev/video2".to_string()))
        );
        assert!(parse_selector("  ").is_err());
    }
}
