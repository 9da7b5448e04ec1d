// SPDX-License-Identifier: GPL-3.0-only

//! Photo Booth - a camera photo booth with real-time filters
//!
//! This library provides the core of the photo booth: camera acquisition, the
//! live filter loop, still capture and the local photo library.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: The booth controller and its operations
//! - [`backends`]: Frame source abstraction (V4L2 cameras, still images)
//! - [`filters`]: The per-pixel filter engine
//! - [`render`]: Live render loop, schedulers and display surfaces
//! - [`pipelines`]: Still capture, preview rendering and JPEG encoding
//! - [`storage`]: The bounded photo library and its persistence
//! - [`config`]: User configuration handling
//! - [`notify`]: User-facing notifications
//! - [`terminal`]: Interactive terminal front end
//!
//! # Example
//!
//! ```ignore
//! // Interactive booth in the terminal:
//! // photo-booth terminal
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod notify;
pub mod pipelines;
pub mod render;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{CountdownEvent, PhotoBooth};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use filters::FilterKind;
