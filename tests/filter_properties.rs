// SPDX-License-Identifier: GPL-3.0-only

//! Properties of the filter engine

use photo_booth::backends::camera::CameraFrame;
use photo_booth::errors::FilterError;
use photo_booth::filters::{self, FilterKind};

/// Deterministic noisy frame
fn noise_frame(width: u32, height: u32, seed: u32) -> CameraFrame {
    let mut state = seed;
    let data: Vec<u8> = (0..width * height * 4)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        })
        .collect();
    CameraFrame::new(width, height, data).unwrap()
}

#[test]
fn test_none_is_identity() {
    let frame = noise_frame(7, 5, 1);
    assert_eq!(filters::apply(&frame, FilterKind::None).unwrap(), frame);
}

#[test]
fn test_grayscale_is_idempotent() {
    let frame = noise_frame(8, 8, 2);
    let once = filters::apply(&frame, FilterKind::Grayscale).unwrap();
    let twice = filters::apply(&once, FilterKind::Grayscale).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_invert_is_involution() {
    let frame = noise_frame(9, 4, 3);
    let inverted = filters::apply(&frame, FilterKind::Invert).unwrap();
    assert_ne!(inverted, frame);
    assert_eq!(filters::apply(&inverted, FilterKind::Invert).unwrap(), frame);
}

#[test]
fn test_brightness_saturates() {
    let cases = [(0u8, 0u8), (100, 130), (195, 254), (196, 255), (255, 255)];
    for (input, expected) in cases {
        let frame = CameraFrame::solid(2, 2, [input, input, input, 77]);
        let out = filters::apply(&frame, FilterKind::Brightness).unwrap();
        assert_eq!(
            out.pixel(1, 1),
            Some([expected, expected, expected, 77]),
            "brightness of {}",
            input
        );
    }
}

#[test]
fn test_filters_keep_alpha() {
    let frame = noise_frame(6, 6, 4);
    for kind in FilterKind::ALL {
        let out = filters::apply(&frame, kind).unwrap();
        for (a, b) in frame.pixels().unwrap().iter().zip(out.pixels().unwrap()) {
            assert_eq!(a[3], b[3], "{} changed alpha", kind);
        }
    }
}

#[test]
fn test_blur_leaves_border_untouched() {
    let (width, height) = (9, 7);
    let frame = noise_frame(width, height, 5);
    let out = filters::apply(&frame, FilterKind::Blur).unwrap();

    for y in 0..height {
        for x in 0..width {
            let border = y < 2 || y >= height - 2 || x < 2 || x >= width - 2;
            if border {
                assert_eq!(out.pixel(x, y), frame.pixel(x, y), "border pixel ({}, {})", x, y);
            }
        }
    }
}

#[test]
fn test_blur_flat_frame_unchanged() {
    let frame = CameraFrame::solid(10, 10, [40, 120, 200, 255]);
    assert_eq!(filters::apply(&frame, FilterKind::Blur).unwrap(), frame);
}

#[test]
fn test_blur_small_frame_unchanged() {
    // No interior pixels below 5x5
    let frame = noise_frame(4, 4, 6);
    assert_eq!(filters::apply(&frame, FilterKind::Blur).unwrap(), frame);
}

#[test]
fn test_red_frame_grayscale() {
    let frame = CameraFrame::solid(4, 4, [255, 0, 0, 255]);
    let out = filters::apply(&frame, FilterKind::Grayscale).unwrap();
    assert!(out.pixels().unwrap().iter().all(|p| *p == [76, 76, 76, 255]));
}

#[test]
fn test_sepia_mid_tones() {
    let mut data = Vec::new();
    data.extend_from_slice(&[100, 150, 50, 128]);
    data.extend_from_slice(&[160, 200, 255, 7]);
    let frame = CameraFrame::new(2, 1, data).unwrap();

    let out = filters::apply(&frame, FilterKind::Sepia).unwrap();
    // 0.393*100 + 0.769*150 + 0.189*50 = 164.1, and so on per row
    assert_eq!(out.pixel(0, 0), Some([164, 146, 114, 128]));
    // Red row sums to 264.875 and clamps; the others stay in range
    assert_eq!(out.pixel(1, 0), Some([255, 236, 184, 7]));
}

#[test]
fn test_named_filter_lookup() {
    let frame = CameraFrame::solid(2, 2, [10, 20, 30, 255]);
    let out = filters::apply_named(&frame, " Invert ").unwrap();
    assert_eq!(out.pixel(0, 0), Some([245, 235, 225, 255]));

    assert_eq!(
        filters::apply_named(&frame, "vintage"),
        Err(FilterError::UnknownFilter("vintage".to_string()))
    );
}
