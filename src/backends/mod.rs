// SPDX-License-Identifier: GPL-3.0-only

//! Frame source backends

pub mod camera;
