// SPDX-License-Identifier: GPL-3.0-only

//! Booth operation handlers
//!
//! This module organizes booth operations by functional domain,
//! keeping related functionality together for easier maintenance.

mod camera;
mod capture;
mod gallery;
