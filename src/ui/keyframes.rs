// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Start and end keyframe slots.

use super::canvas;

/// Which keyframe a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotId {
    Start,
    End,
}

impl SlotId {
    pub const ALL: [Self; 2] = [Self::Start, Self::End];

    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "Start frame",
            Self::End => "End frame (optional)",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Start => 0,
            Self::End => 1,
        }
    }
}

/// Result of keyframe slot interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyframeAction {
    Load(SlotId),
    Edit(SlotId),
    Clear(SlotId),
    /// Copy the slot's payload to the clipboard as a data URL
    CopyDataUrl(SlotId),
}

/// Display one slot with its thumbnail and buttons.
pub fn show_slot(
    ui: &mut egui::Ui,
    slot: SlotId,
    thumbnail: Option<&egui::TextureHandle>,
    loading: bool,
) -> Option<KeyframeAction> {
    let mut action = None;

    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(slot.label()).strong());
            if loading {
                ui.spinner();
            } else {
                canvas::thumbnail(ui, thumbnail, egui::vec2(220.0, 140.0));
            }
            ui.horizontal(|ui| {
                if ui.button("📂 Upload...").clicked() {
                    action = Some(KeyframeAction::Load(slot));
                }
                let has_image = thumbnail.is_some();
                if ui.add_enabled(has_image, egui::Button::new("✏ Edit")).clicked() {
                    action = Some(KeyframeAction::Edit(slot));
                }
                if ui
                    .add_enabled(has_image, egui::Button::new("📋"))
                    .on_hover_text("Copy as data URL")
                    .clicked()
                {
                    action = Some(KeyframeAction::CopyDataUrl(slot));
                }
                if ui.add_enabled(has_image, egui::Button::new("✖")).clicked() {
                    action = Some(KeyframeAction::Clear(slot));
                }
            });
        });
    });

    action
}
