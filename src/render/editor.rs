// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyframe editor session.
//!
//! Owns one source image, its edit history, the cached filtered bitmap and
//! the shake ticker. The filtered bitmap is only recomputed when the color
//! grade changes; camera-preview edits leave it alone.

use image::RgbaImage;
use rand::Rng;

use super::export::{export_final, ExportedImage};
use super::filters::render_filtered;
use super::preview::{PreviewTransform, ShakeTicker};
use crate::io::media::MediaError;
use crate::models::generation::AspectRatio;
use crate::models::history::EditHistory;
use crate::models::params::{ColorGrade, EditParameters, ParamPatch};

pub struct KeyframeEditor {
    source: RgbaImage,
    history: EditHistory,
    filtered: RgbaImage,
    filtered_grade: ColorGrade,
    /// Bumped every time `filtered` is recomputed
    revision: u64,
    shake: ShakeTicker,
}

impl KeyframeEditor {
    pub fn new(source: RgbaImage) -> Self {
        let history = EditHistory::new();
        let grade = history.current().color_grade();
        let filtered = render_filtered(&source, &grade);
        Self {
            source,
            history,
            filtered,
            filtered_grade: grade,
            revision: 0,
            shake: ShakeTicker::new(),
        }
    }

    pub fn params(&self) -> &EditParameters {
        self.history.current()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn source_dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    pub fn filtered(&self) -> &RgbaImage {
        &self.filtered
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn preview_transform(&self) -> PreviewTransform {
        PreviewTransform::from_params(self.params())
    }

    pub fn update(&mut self, patch: &ParamPatch, commit: bool) {
        if patch.is_empty() {
            return;
        }
        self.history.update(patch, commit);
        self.refresh();
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        self.refresh();
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        self.refresh();
        changed
    }

    pub fn reset(&mut self) {
        self.history.reset();
        self.refresh();
    }

    pub fn begin_drag(&mut self) {
        self.history.begin_drag();
    }

    pub fn end_drag(&mut self) -> bool {
        self.history.end_drag()
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_running()
    }

    /// Advance the shake loop by one display frame.
    pub fn tick_shake<R: Rng + ?Sized>(&mut self, rng: &mut R) -> [f32; 2] {
        let params = *self.history.current();
        self.shake.tick(&params, rng)
    }

    /// Stop per-frame work before the editor is discarded.
    pub fn close(&mut self) {
        self.shake.stop();
    }

    /// Export the filtered, rotated and aspect-cropped keyframe.
    pub fn export(&self, aspect: AspectRatio) -> Result<ExportedImage, MediaError> {
        export_final(&self.filtered, self.params().rotation(), aspect)
    }

    fn refresh(&mut self) {
        let params = *self.history.current();
        let grade = params.color_grade();
        if grade != self.filtered_grade {
            self.filtered = render_filtered(&self.source, &grade);
            self.filtered_grade = grade;
            self.revision += 1;
        }
        self.shake.sync(params.shake());
    }
}

impl Drop for KeyframeEditor {
    fn drop(&mut self) {
        self.close();
    }
}
