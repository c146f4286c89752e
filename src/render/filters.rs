// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Color filter chain and vignette overlay.
//!
//! Filters follow CSS filter-function semantics and run in a fixed order:
//! brightness, contrast, saturate, hue-rotate, then grayscale and sepia when
//! enabled. Each step clamps channels to [0, 1] before the next one runs.

use image::{Rgba, RgbaImage};

use crate::models::params::ColorGrade;

/// Vignette is fully transparent inside this fraction of the radius.
const VIGNETTE_INNER_STOP: f32 = 0.4;

type Matrix3 = [[f32; 3]; 3];

/// A single step in the color filter chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    HueRotate(f32),
    Grayscale,
    Sepia,
}

impl FilterOp {
    fn apply(self, [r, g, b]: [f32; 3]) -> [f32; 3] {
        let out = match self {
            Self::Brightness(amount) => [r * amount, g * amount, b * amount],
            Self::Contrast(amount) => {
                let c = |v: f32| (v - 0.5) * amount + 0.5;
                [c(r), c(g), c(b)]
            }
            Self::Saturate(amount) => mul(&saturate_matrix(amount), [r, g, b]),
            Self::HueRotate(degrees) => mul(&hue_rotate_matrix(degrees), [r, g, b]),
            Self::Grayscale => mul(&GRAYSCALE, [r, g, b]),
            Self::Sepia => mul(&SEPIA, [r, g, b]),
        };
        out.map(|v| v.clamp(0.0, 1.0))
    }
}

const GRAYSCALE: Matrix3 = [
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
];

const SEPIA: Matrix3 = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

fn saturate_matrix(s: f32) -> Matrix3 {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn mul(m: &Matrix3, v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Build the ordered filter chain for a grade, skipping identity steps.
pub fn filter_chain(grade: &ColorGrade) -> Vec<FilterOp> {
    let mut chain = Vec::with_capacity(6);
    if grade.brightness != 100.0 {
        chain.push(FilterOp::Brightness(grade.brightness / 100.0));
    }
    if grade.contrast != 100.0 {
        chain.push(FilterOp::Contrast(grade.contrast / 100.0));
    }
    if grade.saturation != 100.0 {
        chain.push(FilterOp::Saturate(grade.saturation / 100.0));
    }
    if grade.hue != 0.0 {
        chain.push(FilterOp::HueRotate(grade.hue));
    }
    if grade.grayscale {
        chain.push(FilterOp::Grayscale);
    }
    if grade.sepia {
        chain.push(FilterOp::Sepia);
    }
    chain
}

/// Rasterize `source` through the color chain, then overlay the vignette.
pub fn render_filtered(source: &RgbaImage, grade: &ColorGrade) -> RgbaImage {
    let chain = filter_chain(grade);
    let mut out = source.clone();

    if !chain.is_empty() {
        for pixel in out.pixels_mut() {
            let mut rgb = [
                pixel[0] as f32 / 255.0,
                pixel[1] as f32 / 255.0,
                pixel[2] as f32 / 255.0,
            ];
            for op in &chain {
                rgb = op.apply(rgb);
            }
            pixel[0] = to_u8(rgb[0]);
            pixel[1] = to_u8(rgb[1]);
            pixel[2] = to_u8(rgb[2]);
        }
    }

    if grade.vignette != 0.0 {
        apply_vignette(&mut out, grade.vignette);
    }

    out
}

/// Overlay a radial vignette. Positive amounts darken, negative lighten.
pub fn apply_vignette(image: &mut RgbaImage, amount: f32) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || amount == 0.0 {
        return;
    }

    let color: [f32; 3] = if amount > 0.0 { [0.0; 3] } else { [255.0; 3] };
    let max_alpha = (amount.abs() / 100.0).min(1.0);
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = (cx * cx + cy * cy).sqrt();

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let alpha = vignette_alpha((dx * dx + dy * dy).sqrt() / radius, max_alpha);
        if alpha > 0.0 {
            blend_over(pixel, color, alpha);
        }
    }
}

/// Gradient opacity at normalized distance `t` from the center.
pub fn vignette_alpha(t: f32, max_alpha: f32) -> f32 {
    if t <= VIGNETTE_INNER_STOP {
        0.0
    } else {
        let f = ((t - VIGNETTE_INNER_STOP) / (1.0 - VIGNETTE_INNER_STOP)).min(1.0);
        f * max_alpha
    }
}

fn blend_over(pixel: &mut Rgba<u8>, color: [f32; 3], alpha: f32) {
    for (channel, c) in pixel.0.iter_mut().take(3).zip(color) {
        *channel = (c * alpha + *channel as f32 * (1.0 - alpha)).round().clamp(0.0, 255.0) as u8;
    }
    let dst_alpha = pixel[3] as f32 / 255.0;
    pixel[3] = to_u8(alpha + dst_alpha * (1.0 - alpha));
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::{EditParameters, ParamPatch};

    fn grade(patch: ParamPatch) -> ColorGrade {
        EditParameters::default().merged(&patch).color_grade()
    }

    fn solid(r: u8, g: u8, b: u8) -> RgbaImage {
        RgbaImage::from_pixel(8, 8, Rgba([r, g, b, 255]))
    }

    #[test]
    fn default_grade_is_identity() {
        let source = solid(12, 200, 99);
        let grade = EditParameters::default().color_grade();
        assert!(filter_chain(&grade).is_empty());
        assert_eq!(render_filtered(&source, &grade), source);
    }

    #[test]
    fn chain_order_is_fixed() {
        let chain = filter_chain(&grade(ParamPatch {
            sepia: Some(true),
            grayscale: Some(true),
            hue: Some(90.0),
            brightness: Some(150.0),
            contrast: Some(50.0),
            saturation: Some(0.0),
            ..Default::default()
        }));
        assert_eq!(
            chain,
            vec![
                FilterOp::Brightness(1.5),
                FilterOp::Contrast(0.5),
                FilterOp::Saturate(0.0),
                FilterOp::HueRotate(90.0),
                FilterOp::Grayscale,
                FilterOp::Sepia,
            ]
        );
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let out = render_filtered(
            &solid(100, 200, 0),
            &grade(ParamPatch {
                brightness: Some(200.0),
                ..Default::default()
            }),
        );
        assert_eq!(out.get_pixel(0, 0).0, [200, 255, 0, 255]);
    }

    #[test]
    fn zero_contrast_is_mid_gray() {
        let out = render_filtered(
            &solid(10, 240, 77),
            &grade(ParamPatch {
                contrast: Some(0.0),
                ..Default::default()
            }),
        );
        assert_eq!(out.get_pixel(3, 3).0, [128, 128, 128, 255]);
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let out = render_filtered(
            &solid(255, 0, 0),
            &grade(ParamPatch {
                grayscale: Some(true),
                ..Default::default()
            }),
        );
        let [r, g, b, _] = out.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(r, 54);
    }

    #[test]
    fn full_hue_turn_is_near_identity() {
        let rgb = FilterOp::HueRotate(360.0).apply([0.2, 0.5, 0.8]);
        assert!((rgb[0] - 0.2).abs() < 1e-3);
        assert!((rgb[1] - 0.5).abs() < 1e-3);
        assert!((rgb[2] - 0.8).abs() < 1e-3);
    }

    #[test]
    fn vignette_alpha_profile() {
        assert_eq!(vignette_alpha(0.0, 0.8), 0.0);
        assert_eq!(vignette_alpha(0.4, 0.8), 0.0);
        assert!((vignette_alpha(0.7, 0.8) - 0.4).abs() < 1e-6);
        assert!((vignette_alpha(1.0, 0.8) - 0.8).abs() < 1e-6);
        assert!((vignette_alpha(1.2, 0.8) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn dark_vignette_leaves_center_and_darkens_corners() {
        let mut image = RgbaImage::from_pixel(101, 101, Rgba([200, 200, 200, 255]));
        apply_vignette(&mut image, 100.0);
        assert_eq!(image.get_pixel(50, 50).0, [200, 200, 200, 255]);
        assert!(image.get_pixel(0, 0)[0] < 20);
    }

    #[test]
    fn light_vignette_brightens_corners() {
        let mut image = RgbaImage::from_pixel(101, 101, Rgba([50, 50, 50, 255]));
        apply_vignette(&mut image, -100.0);
        assert!(image.get_pixel(100, 100)[0] > 230);
        assert_eq!(image.get_pixel(50, 50)[0], 50);
    }
}
