// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for still capture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Frame source │ ──▶ │  Photo pipeline   │ ──▶ │ PhotoLibrary │
//! │   (RGBA)     │     │  - Filter engine  │     │  (JPEG/JSON) │
//! │              │     │  - Rescale        │     │              │
//! │              │     │  - JPEG encoding  │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! Capture pulls its own frame from the source and never pauses the live
//! render loop.

pub mod photo;
