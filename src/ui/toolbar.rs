// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyframe editor controls.
//!
//! This module provides the adjustment panel shown next to the editor
//! preview. It never touches the editor directly; every interaction is
//! reported back as an [`EditorAction`] for the app to apply in order.

use crate::io::keybind::HistoryKeys;
use crate::models::params::{
    ParamPatch, BRIGHTNESS_RANGE, CONTRAST_RANGE, PERSPECTIVE_RANGE, SATURATION_RANGE,
    SHAKE_RANGE, TILT_RANGE, VIGNETTE_RANGE,
};
use crate::render::editor::KeyframeEditor;

/// Result of editor panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    Update { patch: ParamPatch, commit: bool },
    BeginDrag,
    EndDrag,
    Undo,
    Redo,
    Reset,
    Apply,
    Cancel,
}

/// Display the editor controls and collect this frame's actions.
pub fn show(ui: &mut egui::Ui, editor: &KeyframeEditor, keys: &HistoryKeys) -> Vec<EditorAction> {
    let mut actions = Vec::new();
    let params = *editor.params();
    let dragging = editor.history().is_dragging();

    ui.horizontal(|ui| {
        let undo = egui::Button::new("⟲ Undo");
        if ui
            .add_enabled(editor.history().can_undo(), undo)
            .on_hover_text(format!("{} ({} steps)", keys.undo, editor.history().undo_depth()))
            .clicked()
        {
            actions.push(EditorAction::Undo);
        }
        let redo = egui::Button::new("⟳ Redo");
        if ui
            .add_enabled(editor.history().can_redo(), redo)
            .on_hover_text(format!("{} ({} steps)", keys.redo, editor.history().redo_depth()))
            .clicked()
        {
            actions.push(EditorAction::Redo);
        }
        if ui.button("Reset").clicked() {
            actions.push(EditorAction::Reset);
        }
    });

    ui.separator();
    ui.heading("Color");

    let mut controls = SliderGroup {
        actions: &mut actions,
        dragging,
    };
    controls.slider(ui, "Brightness", params.brightness(), BRIGHTNESS_RANGE, "%", |v| ParamPatch {
        brightness: Some(v),
        ..Default::default()
    });
    controls.slider(ui, "Contrast", params.contrast(), CONTRAST_RANGE, "%", |v| ParamPatch {
        contrast: Some(v),
        ..Default::default()
    });
    controls.slider(ui, "Saturation", params.saturation(), SATURATION_RANGE, "%", |v| ParamPatch {
        saturation: Some(v),
        ..Default::default()
    });
    controls.slider(ui, "Hue", params.hue(), (0.0, 359.0), "°", |v| ParamPatch {
        hue: Some(v),
        ..Default::default()
    });
    controls.slider(ui, "Vignette", params.vignette(), VIGNETTE_RANGE, "", |v| ParamPatch {
        vignette: Some(v),
        ..Default::default()
    });

    ui.horizontal(|ui| {
        let mut grayscale = params.grayscale();
        if ui.checkbox(&mut grayscale, "Grayscale").changed() {
            controls.actions.push(EditorAction::Update {
                patch: ParamPatch {
                    grayscale: Some(grayscale),
                    ..Default::default()
                },
                commit: true,
            });
        }
        let mut sepia = params.sepia();
        if ui.checkbox(&mut sepia, "Sepia").changed() {
            controls.actions.push(EditorAction::Update {
                patch: ParamPatch {
                    sepia: Some(sepia),
                    ..Default::default()
                },
                commit: true,
            });
        }
    });

    ui.separator();
    ui.heading("Camera");

    ui.horizontal(|ui| {
        ui.label(format!("Rotation: {}°", params.rotation().degrees()));
        if ui.button("↺ 90°").clicked() {
            controls.actions.push(EditorAction::Update {
                patch: ParamPatch {
                    rotation: Some(params.rotation().counter_clockwise()),
                    ..Default::default()
                },
                commit: true,
            });
        }
        if ui.button("↻ 90°").clicked() {
            controls.actions.push(EditorAction::Update {
                patch: ParamPatch {
                    rotation: Some(params.rotation().clockwise()),
                    ..Default::default()
                },
                commit: true,
            });
        }
    });

    controls.slider(ui, "Tilt X", params.tilt_x(), TILT_RANGE, "°", |v| ParamPatch {
        tilt_x: Some(v),
        ..Default::default()
    });
    controls.slider(ui, "Tilt Y", params.tilt_y(), TILT_RANGE, "°", |v| ParamPatch {
        tilt_y: Some(v),
        ..Default::default()
    });
    controls.slider(ui, "Perspective", params.perspective(), PERSPECTIVE_RANGE, " px", |v| ParamPatch {
        perspective: Some(v),
        ..Default::default()
    });
    controls.slider(ui, "Shake", params.shake(), SHAKE_RANGE, "", |v| ParamPatch {
        shake: Some(v),
        ..Default::default()
    });

    ui.label(
        egui::RichText::new("Tilt, perspective and shake are preview-only and are not exported.")
            .italics()
            .weak(),
    );

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("✔ Apply").clicked() {
            actions.push(EditorAction::Apply);
        }
        if ui.button("Cancel").clicked() {
            actions.push(EditorAction::Cancel);
        }
    });

    actions
}

/// Sliders that turn drags into a single history entry.
struct SliderGroup<'a> {
    actions: &'a mut Vec<EditorAction>,
    dragging: bool,
}

impl SliderGroup<'_> {
    fn slider(
        &mut self,
        ui: &mut egui::Ui,
        label: &str,
        value: f32,
        range: (f32, f32),
        suffix: &str,
        patch: impl Fn(f32) -> ParamPatch,
    ) {
        let mut edited = value;
        let response = ui.add(
            egui::Slider::new(&mut edited, range.0..=range.1)
                .text(label)
                .suffix(suffix),
        );

        if response.drag_started() {
            self.actions.push(EditorAction::BeginDrag);
            self.dragging = true;
        }
        if response.changed() {
            // typed or keyboard edits commit immediately; drags commit on release
            let commit = !self.dragging && !response.dragged();
            self.actions.push(EditorAction::Update {
                patch: patch(edited),
                commit,
            });
        }
        if response.drag_stopped() {
            self.actions.push(EditorAction::EndDrag);
            self.dragging = false;
        }
    }
}
