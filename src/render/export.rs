// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Final keyframe export.
//!
//! Only the color filters, vignette and planar rotation survive export.
//! Tilt, perspective and shake are preview-only looks and are never baked in.

use image::{imageops, RgbaImage};

use crate::io::media::{self, MediaError};
use crate::models::generation::{AspectRatio, ImagePayload};
use crate::models::params::PlanarRotation;
use crate::util::geometry::{fit_aspect, rotated_dimensions};

/// A keyframe ready to be shown as a thumbnail and submitted to the backend.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub image: RgbaImage,
    pub payload: ImagePayload,
}

/// Rotate the filtered bitmap and center-crop it to the target aspect ratio.
pub fn crop_to_aspect(
    filtered: &RgbaImage,
    rotation: PlanarRotation,
    aspect: AspectRatio,
) -> RgbaImage {
    let (base_w, base_h) = rotated_dimensions(filtered.width(), filtered.height(), rotation);
    let (out_w, out_h) = fit_aspect(base_w, base_h, aspect.ratio());

    let rotated = match rotation {
        PlanarRotation::Deg0 => filtered.clone(),
        PlanarRotation::Deg90 => imageops::rotate90(filtered),
        PlanarRotation::Deg180 => imageops::rotate180(filtered),
        PlanarRotation::Deg270 => imageops::rotate270(filtered),
    };

    let x = (base_w - out_w) / 2;
    let y = (base_h - out_h) / 2;
    imageops::crop_imm(&rotated, x, y, out_w, out_h).to_image()
}

/// Produce the final PNG keyframe for submission.
pub fn export_final(
    filtered: &RgbaImage,
    rotation: PlanarRotation,
    aspect: AspectRatio,
) -> Result<ExportedImage, MediaError> {
    let image = crop_to_aspect(filtered, rotation, aspect);
    let payload = media::encode_png_payload(&image)?;
    log::info!(
        "Exported keyframe {}x{} ({}, rotation {})",
        image.width(),
        image.height(),
        aspect.as_str(),
        rotation.degrees()
    );
    Ok(ExportedImage { image, payload })
}
