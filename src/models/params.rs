// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Visual edit parameters for a single keyframe image.
//!
//! An [`EditParameters`] value is an immutable snapshot: every field always
//! holds an in-range value, and changes are expressed as a [`ParamPatch`]
//! merged into a snapshot to produce a new one.

use serde::{Deserialize, Serialize};

pub const BRIGHTNESS_RANGE: (f32, f32) = (0.0, 200.0);
pub const CONTRAST_RANGE: (f32, f32) = (0.0, 200.0);
pub const SATURATION_RANGE: (f32, f32) = (0.0, 200.0);
pub const VIGNETTE_RANGE: (f32, f32) = (-100.0, 100.0);
pub const TILT_RANGE: (f32, f32) = (-60.0, 60.0);
pub const PERSPECTIVE_RANGE: (f32, f32) = (500.0, 2500.0);
pub const SHAKE_RANGE: (f32, f32) = (0.0, 100.0);

/// Planar rotation of the image in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlanarRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl PlanarRotation {
    /// Build a rotation from any whole degree value, snapping to the nearest quarter turn.
    pub fn from_degrees(degrees: i32) -> Self {
        let quarter = ((degrees as f32 / 90.0).round() as i32).rem_euclid(4);
        match quarter {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn radians(self) -> f32 {
        self.degrees() as f32 * std::f32::consts::PI / 180.0
    }

    /// Rotate a further 90 degrees clockwise.
    pub fn clockwise(self) -> Self {
        Self::from_degrees(self.degrees() as i32 + 90)
    }

    /// Rotate a further 90 degrees counter-clockwise.
    pub fn counter_clockwise(self) -> Self {
        Self::from_degrees(self.degrees() as i32 - 90)
    }

    /// Whether this rotation exchanges image width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// The color-affecting subset of the parameters.
///
/// The filtered bitmap only needs recomputing when this changes; camera
/// preview fields (tilt, perspective, shake, rotation) never touch it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGrade {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub hue: f32,
    pub vignette: f32,
    pub grayscale: bool,
    pub sepia: bool,
}

/// A complete, always-valid snapshot of edit parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditParameters {
    brightness: f32,
    contrast: f32,
    saturation: f32,
    hue: f32,
    vignette: f32,
    grayscale: bool,
    sepia: bool,
    rotation: PlanarRotation,
    tilt_x: f32,
    tilt_y: f32,
    perspective: f32,
    shake: f32,
}

impl Default for EditParameters {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            hue: 0.0,
            vignette: 0.0,
            grayscale: false,
            sepia: false,
            rotation: PlanarRotation::Deg0,
            tilt_x: 0.0,
            tilt_y: 0.0,
            perspective: 1000.0,
            shake: 0.0,
        }
    }
}

/// A partial update. `None` fields leave the snapshot untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamPatch {
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub hue: Option<f32>,
    pub vignette: Option<f32>,
    pub grayscale: Option<bool>,
    pub sepia: Option<bool>,
    pub rotation: Option<PlanarRotation>,
    pub tilt_x: Option<f32>,
    pub tilt_y: Option<f32>,
    pub perspective: Option<f32>,
    pub shake: Option<f32>,
}

impl ParamPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl EditParameters {
    /// Merge a patch into this snapshot, clamping every value into range.
    pub fn merged(&self, patch: &ParamPatch) -> Self {
        let d = Self::default();
        Self {
            brightness: patch
                .brightness
                .map_or(self.brightness, |v| clamp_or(v, BRIGHTNESS_RANGE, d.brightness)),
            contrast: patch
                .contrast
                .map_or(self.contrast, |v| clamp_or(v, CONTRAST_RANGE, d.contrast)),
            saturation: patch
                .saturation
                .map_or(self.saturation, |v| clamp_or(v, SATURATION_RANGE, d.saturation)),
            hue: patch.hue.map_or(self.hue, normalize_hue),
            vignette: patch
                .vignette
                .map_or(self.vignette, |v| clamp_or(v, VIGNETTE_RANGE, d.vignette)),
            grayscale: patch.grayscale.unwrap_or(self.grayscale),
            sepia: patch.sepia.unwrap_or(self.sepia),
            rotation: patch.rotation.unwrap_or(self.rotation),
            tilt_x: patch
                .tilt_x
                .map_or(self.tilt_x, |v| clamp_or(v, TILT_RANGE, d.tilt_x)),
            tilt_y: patch
                .tilt_y
                .map_or(self.tilt_y, |v| clamp_or(v, TILT_RANGE, d.tilt_y)),
            perspective: patch
                .perspective
                .map_or(self.perspective, |v| clamp_or(v, PERSPECTIVE_RANGE, d.perspective)),
            shake: patch
                .shake
                .map_or(self.shake, |v| clamp_or(v, SHAKE_RANGE, d.shake)),
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn vignette(&self) -> f32 {
        self.vignette
    }

    pub fn grayscale(&self) -> bool {
        self.grayscale
    }

    pub fn sepia(&self) -> bool {
        self.sepia
    }

    pub fn rotation(&self) -> PlanarRotation {
        self.rotation
    }

    pub fn tilt_x(&self) -> f32 {
        self.tilt_x
    }

    pub fn tilt_y(&self) -> f32 {
        self.tilt_y
    }

    pub fn perspective(&self) -> f32 {
        self.perspective
    }

    pub fn shake(&self) -> f32 {
        self.shake
    }

    pub fn color_grade(&self) -> ColorGrade {
        ColorGrade {
            brightness: self.brightness,
            contrast: self.contrast,
            saturation: self.saturation,
            hue: self.hue,
            vignette: self.vignette,
            grayscale: self.grayscale,
            sepia: self.sepia,
        }
    }
}

fn clamp_or(value: f32, (lo, hi): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

fn normalize_hue(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
