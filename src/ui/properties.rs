// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Director's Suite panel.
//!
//! This module provides the panel for writing the prompt and choosing the
//! camera, motion, atmosphere and output settings of the next generation.
//! Settings are edited in place; file and network work is handed back to
//! the app as a [`DirectorAction`].

use crate::models::director::{
    Atmosphere, CameraAngle, DirectorSettings, MotionStyle, PROMPT_PRESETS, SPEED_RANGE,
};
use crate::models::generation::{AspectRatio, Resolution};
use crate::prompt::compose_prompt;

/// Result of Director's Suite interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectorAction {
    None,
    /// Ask the text model to turn an idea into a prompt
    Suggest(String),
    SavePreset,
    LoadPreset,
}

/// Panel state that is not part of the saved settings.
#[derive(Debug, Default)]
pub struct DirectorPanelState {
    pub idea: String,
    pub suggesting: bool,
    pub suggestion_error: Option<String>,
}

/// Display the Director's Suite.
pub fn show(
    ui: &mut egui::Ui,
    settings: &mut DirectorSettings,
    state: &mut DirectorPanelState,
) -> DirectorAction {
    let mut action = DirectorAction::None;

    ui.heading("Director's Suite");
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Preset:");
        egui::ComboBox::from_id_source("prompt_preset")
            .selected_text("Choose...")
            .show_ui(ui, |ui| {
                for preset in PROMPT_PRESETS {
                    if ui.selectable_label(false, preset.name).clicked() {
                        settings.base_prompt = preset.text.to_string();
                    }
                }
            });
    });

    ui.label("Prompt:");
    ui.add(
        egui::TextEdit::multiline(&mut settings.base_prompt)
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );

    egui::CollapsingHeader::new("✨ Director AI")
        .default_open(false)
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::singleline(&mut state.idea)
                    .hint_text("Describe your idea in a few words")
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                let ready = !state.suggesting && !state.idea.trim().is_empty();
                if ui
                    .add_enabled(ready, egui::Button::new("Suggest prompt"))
                    .clicked()
                {
                    action = DirectorAction::Suggest(state.idea.trim().to_string());
                }
                if state.suggesting {
                    ui.spinner();
                }
            });
            if let Some(error) = &state.suggestion_error {
                ui.colored_label(egui::Color32::from_rgb(230, 110, 110), error);
            }
        });

    ui.separator();
    ui.checkbox(&mut settings.advanced, "Advanced camera controls");

    if settings.advanced {
        ui.horizontal(|ui| {
            ui.label("Camera angle:");
            egui::ComboBox::from_id_source("camera_angle")
                .selected_text(settings.camera_angle.label())
                .show_ui(ui, |ui| {
                    for angle in CameraAngle::ALL {
                        ui.selectable_value(&mut settings.camera_angle, angle, angle.label());
                    }
                });
        });

        ui.horizontal(|ui| {
            ui.label("Motion:");
            egui::ComboBox::from_id_source("motion_style")
                .selected_text(settings.motion_style.label())
                .show_ui(ui, |ui| {
                    for style in MotionStyle::ALL {
                        ui.selectable_value(&mut settings.motion_style, style, style.label());
                    }
                });
        });

        ui.label("Atmosphere:");
        ui.horizontal_wrapped(|ui| {
            for tag in Atmosphere::ALL {
                let selected = settings.atmosphere.contains(&tag);
                if ui.selectable_label(selected, tag.display_name()).clicked() {
                    settings.toggle_atmosphere(tag);
                }
            }
        });
    }

    ui.add(
        egui::Slider::new(&mut settings.speed, SPEED_RANGE.0..=SPEED_RANGE.1)
            .text("Speed")
            .suffix("×")
            .step_by(0.05),
    );
    ui.checkbox(&mut settings.motion_blur, "Motion blur");
    ui.checkbox(&mut settings.stabilization, "Stabilization");

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Aspect:");
        for aspect in AspectRatio::ALL {
            ui.selectable_value(&mut settings.aspect_ratio, aspect, aspect.as_str());
        }
    });
    ui.horizontal(|ui| {
        ui.label("Resolution:");
        for resolution in Resolution::ALL {
            ui.selectable_value(&mut settings.resolution, resolution, resolution.as_str());
        }
    });

    ui.separator();
    ui.collapsing("Final prompt", |ui| {
        ui.label(egui::RichText::new(compose_prompt(settings)).weak());
    });

    ui.horizontal(|ui| {
        if ui.button("Save preset...").clicked() {
            action = DirectorAction::SavePreset;
        }
        if ui.button("Load preset...").clicked() {
            action = DirectorAction::LoadPreset;
        }
    });

    action
}
