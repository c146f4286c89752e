// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the sizing math shared by the preview canvas and
//! the export step: rotation-aware dimensions, aspect-ratio fitting, and
//! scaling content into an available area.

use crate::models::params::PlanarRotation;

/// Image dimensions after applying a planar rotation.
pub fn rotated_dimensions(width: u32, height: u32, rotation: PlanarRotation) -> (u32, u32) {
    if rotation.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Largest `ratio` (width / height) rectangle that fits inside `width` x `height`.
///
/// Width-driven first: keep the full width and derive the height. If that
/// height overflows, keep the full height and derive the width instead.
/// The result never exceeds the input in either axis.
pub fn fit_aspect(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    if width == 0 || height == 0 || !ratio.is_finite() || ratio <= 0.0 {
        return (width, height);
    }

    let fitted_height = (width as f64 / ratio).floor() as u32;
    if fitted_height <= height {
        return (width, fitted_height.max(1));
    }

    let fitted_width = ((height as f64 * ratio).floor() as u32).min(width);
    (fitted_width.max(1), height)
}

/// Scale `content` uniformly so it fits inside `available`, preserving aspect.
pub fn fit_within(content: (f32, f32), available: (f32, f32)) -> (f32, f32) {
    let (cw, ch) = content;
    let (aw, ah) = available;
    if cw <= 0.0 || ch <= 0.0 || aw <= 0.0 || ah <= 0.0 {
        return (0.0, 0.0);
    }

    let content_aspect = cw / ch;
    let available_aspect = aw / ah;
    if content_aspect > available_aspect {
        // Content is wider - fit to width
        (aw, aw / content_aspect)
    } else {
        // Content is taller - fit to height
        (ah * content_aspect, ah)
    }
}
