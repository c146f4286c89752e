// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Presentation-only transforms for the live preview.
//!
//! Tilt, perspective and planar rotation are applied to the displayed quad,
//! never to the filtered bitmap, so moving the camera preview never triggers
//! a filter recompute. Camera shake is a per-frame ticking task.

use rand::Rng;

use crate::models::params::{EditParameters, PlanarRotation};

/// Shake offset per axis is a random value in [-1, 1] times intensity / this.
const SHAKE_DIVISOR: f32 = 20.0;
/// Keeps points behind the viewer from flipping through the projection.
const MIN_PERSPECTIVE_W: f32 = 0.05;

/// The 3D presentation of the preview surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    pub rotation: PlanarRotation,
    pub tilt_x: f32,
    pub tilt_y: f32,
    pub perspective: f32,
}

impl PreviewTransform {
    pub fn from_params(params: &EditParameters) -> Self {
        Self {
            rotation: params.rotation(),
            tilt_x: params.tilt_x(),
            tilt_y: params.tilt_y(),
            perspective: params.perspective(),
        }
    }

    /// Project the corners of a `width` x `height` surface centered on the origin.
    ///
    /// Returned in top-left, top-right, bottom-right, bottom-left order,
    /// relative to the surface center (y grows downward).
    pub fn project_corners(&self, width: f32, height: f32) -> [[f32; 2]; 4] {
        let hw = width / 2.0;
        let hh = height / 2.0;
        [[-hw, -hh], [hw, -hh], [hw, hh], [-hw, hh]].map(|[x, y]| self.project_point(x, y))
    }

    /// Size of the axis-aligned box enclosing the projected surface.
    pub fn projected_extent(&self, width: f32, height: f32) -> (f32, f32) {
        let corners = self.project_corners(width, height);
        let (mut min_x, mut max_x) = (f32::MAX, f32::MIN);
        let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
        for [x, y] in corners {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        (max_x - min_x, max_y - min_y)
    }

    /// Project one surface point, given relative to the surface center.
    pub fn project_point(&self, x: f32, y: f32) -> [f32; 2] {
        // planar rotation (clockwise on screen)
        let (sin_r, cos_r) = self.rotation.radians().sin_cos();
        let (x, y) = (x * cos_r - y * sin_r, x * sin_r + y * cos_r);

        // rotateY then rotateX, with z toward the viewer
        let (sin_y, cos_y) = self.tilt_y.to_radians().sin_cos();
        let (x, z) = (x * cos_y, -x * sin_y);

        let (sin_x, cos_x) = self.tilt_x.to_radians().sin_cos();
        let (y, z) = (y * cos_x - z * sin_x, y * sin_x + z * cos_x);

        let w = (1.0 - z / self.perspective).max(MIN_PERSPECTIVE_W);
        [x / w, y / w]
    }
}

/// Per-frame camera shake, owned by the editor.
///
/// Started when intensity becomes positive, stopped as soon as it returns
/// to zero or the owner calls [`ShakeTicker::stop`] on teardown. Each tick
/// takes the intensity from the live parameters rather than a copy captured
/// when the loop started.
#[derive(Debug, Default)]
pub struct ShakeTicker {
    running: bool,
    offset: [f32; 2],
}

impl ShakeTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or stop the loop to match the current intensity.
    pub fn sync(&mut self, intensity: f32) {
        if intensity > 0.0 {
            if !self.running {
                log::debug!("Camera shake started");
            }
            self.running = true;
        } else {
            self.stop();
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Camera shake stopped");
        }
        self.running = false;
        self.offset = [0.0, 0.0];
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance one display frame and return the surface offset to draw with.
    pub fn tick<R: Rng + ?Sized>(&mut self, params: &EditParameters, rng: &mut R) -> [f32; 2] {
        let intensity = params.shake();
        if intensity <= 0.0 {
            self.stop();
            return self.offset;
        }
        if !self.running {
            return self.offset;
        }
        let scale = intensity / SHAKE_DIVISOR;
        self.offset = [
            rng.random_range(-1.0..=1.0) * scale,
            rng.random_range(-1.0..=1.0) * scale,
        ];
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::ParamPatch;
    use rand::{rngs::StdRng, SeedableRng};

    fn params(patch: ParamPatch) -> EditParameters {
        EditParameters::default().merged(&patch)
    }

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-3 && (a[1] - b[1]).abs() < 1e-3
    }

    #[test]
    fn flat_transform_keeps_corners() {
        let t = PreviewTransform::from_params(&EditParameters::default());
        let corners = t.project_corners(200.0, 100.0);
        assert!(approx(corners[0], [-100.0, -50.0]));
        assert!(approx(corners[2], [100.0, 50.0]));
    }

    #[test]
    fn quarter_turn_rotates_clockwise() {
        let t = PreviewTransform::from_params(&params(ParamPatch {
            rotation: Some(PlanarRotation::Deg90),
            ..Default::default()
        }));
        let corners = t.project_corners(200.0, 100.0);
        // top-left swings to the top-right of the rotated surface
        assert!(approx(corners[0], [50.0, -100.0]));
        assert!(approx(t.projected_extent(200.0, 100.0).into(), [100.0, 200.0]));
    }

    #[test]
    fn tilt_y_foreshortens_one_side() {
        let t = PreviewTransform::from_params(&params(ParamPatch {
            tilt_y: Some(30.0),
            ..Default::default()
        }));
        let [tl, tr, _, _] = t.project_corners(200.0, 200.0);
        // the right edge recedes (smaller), the left edge comes forward (larger)
        assert!(tr[1].abs() < 100.0);
        assert!(tl[1].abs() > 100.0);
    }

    #[test]
    fn deeper_perspective_flattens_tilt() {
        let shallow = PreviewTransform::from_params(&params(ParamPatch {
            tilt_x: Some(40.0),
            perspective: Some(500.0),
            ..Default::default()
        }));
        let deep = PreviewTransform {
            perspective: 2500.0,
            ..shallow
        };
        let (w_shallow, _) = shallow.projected_extent(400.0, 400.0);
        let (w_deep, _) = deep.projected_extent(400.0, 400.0);
        assert!(w_shallow > w_deep);
    }

    #[test]
    fn shake_runs_only_while_intensity_positive() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ticker = ShakeTicker::new();
        let shaking = params(ParamPatch {
            shake: Some(100.0),
            ..Default::default()
        });

        ticker.sync(shaking.shake());
        assert!(ticker.is_running());
        for _ in 0..50 {
            let [dx, dy] = ticker.tick(&shaking, &mut rng);
            assert!(dx.abs() <= 5.0 && dy.abs() <= 5.0);
        }

        // the next frame sees the live value drop to zero and stops itself
        let still = EditParameters::default();
        assert_eq!(ticker.tick(&still, &mut rng), [0.0, 0.0]);
        assert!(!ticker.is_running());
    }

    #[test]
    fn stopped_ticker_never_moves() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ticker = ShakeTicker::new();
        let shaking = params(ParamPatch {
            shake: Some(50.0),
            ..Default::default()
        });
        ticker.sync(50.0);
        ticker.stop();
        assert_eq!(ticker.tick(&shaking, &mut rng), [0.0, 0.0]);
    }
}
