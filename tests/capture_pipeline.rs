// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipeline: preview sizing and encoding

use photo_booth::backends::camera::{CameraFrame, DeviceSelector, StillImageSource, lock_source, share};
use photo_booth::errors::PhotoError;
use photo_booth::filters::FilterKind;
use photo_booth::pipelines::photo::{PhotoPipeline, fit_within, render_preview};

fn assert_fits(source: (u32, u32), bounds: (u32, u32)) {
    let still = CameraFrame::solid(source.0, source.1, [120, 60, 30, 255]);
    let preview = render_preview(&still, FilterKind::Sepia, bounds.0, bounds.1).unwrap();
    let (w, h) = (preview.frame.width, preview.frame.height);

    assert!(w <= bounds.0 && h <= bounds.1, "{:?} exceeds {:?}", (w, h), bounds);
    assert!(w <= source.0 && h <= source.1, "{:?} upscaled from {:?}", (w, h), source);

    // Aspect ratio within one pixel of flooring
    let expected_h = w as f64 * source.1 as f64 / source.0 as f64;
    assert!(
        (h as f64 - expected_h).abs() <= 1.0,
        "{}x{} from {}x{}",
        w,
        h,
        source.0,
        source.1
    );
}

#[test]
fn test_preview_fits_bounds() {
    assert_fits((1280, 720), (600, 400));
    assert_fits((640, 960), (600, 400));
    assert_fits((1000, 1000), (600, 400));
    assert_fits((320, 240), (600, 400));
    assert_fits((601, 3), (600, 400));
}

#[test]
fn test_fit_within_examples() {
    assert_eq!(fit_within(1280, 720, 600, 400), (600, 337));
    assert_eq!(fit_within(600, 800, 600, 400), (300, 400));
    assert_eq!(fit_within(200, 100, 600, 400), (200, 100));
}

#[test]
fn test_preview_keeps_filter_tag() {
    let still = CameraFrame::solid(4, 4, [255, 0, 0, 255]);
    let preview = render_preview(&still, FilterKind::Grayscale, 600, 400).unwrap();
    assert_eq!(preview.filter, FilterKind::Grayscale);
    assert_eq!(preview.frame.pixel(0, 0), Some([76, 76, 76, 255]));
}

#[test]
fn test_capture_without_stream_fails() {
    let source = share(StillImageSource::new().with_frame("a", CameraFrame::solid(2, 2, [0, 0, 0, 255])));
    let pipeline = PhotoPipeline::default();
    assert_eq!(
        pipeline.capture(&source, FilterKind::None).err(),
        Some(PhotoError::NoFrameAvailable)
    );
}

#[test]
fn test_reapply_starts_from_still() {
    let source = share(StillImageSource::new().with_frame("a", CameraFrame::solid(8, 6, [200, 100, 50, 255])));
    let _handle = lock_source(&source).start(&DeviceSelector::Default).unwrap();

    let pipeline = PhotoPipeline::default();
    let mut session = pipeline.capture(&source, FilterKind::Sepia).unwrap();
    pipeline.reapply(&mut session, FilterKind::Invert).unwrap();

    assert_eq!(session.filter(), FilterKind::Invert);
    assert_eq!(session.preview().frame.pixel(0, 0), Some([55, 155, 205, 255]));

    let photo = pipeline.finalize(&session).unwrap();
    assert_eq!(photo.filter, FilterKind::Invert);
    assert!(photo.data.starts_with(&[0xFF, 0xD8]));
}
