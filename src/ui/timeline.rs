// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Generation and playback panel.
//!
//! This module provides the bottom panel: the Generate button, job
//! progress, the video transport for the finished clip, and the ambient and
//! effect channel mixer.

use std::time::Duration;

use crate::models::audio::{AudioSelection, AudioTrack, ChannelKind};
use crate::models::generation::{GenerationJob, JobPhase};

/// Result of generation panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineAction {
    Generate,
    Play,
    Pause,
    Download,
    SelectTrack(ChannelKind, AudioTrack),
    SetVolume(ChannelKind, f32),
}

/// What the panel needs to know about the rest of the app.
pub struct TimelineView<'a> {
    pub job: &'a GenerationJob,
    pub has_start_image: bool,
    pub video_playing: bool,
    /// Elapsed playback position of the finished clip
    pub video_position: Option<Duration>,
    pub playback_error: Option<&'a str>,
    pub audio: &'a AudioSelection,
}

/// Display the generation panel.
pub fn show(ui: &mut egui::Ui, view: TimelineView<'_>) -> Vec<TimelineAction> {
    let mut actions = Vec::new();
    let job = view.job;

    ui.horizontal(|ui| {
        let enabled = job.can_submit() && view.has_start_image;
        let button = egui::Button::new(egui::RichText::new("🎬 Generate").size(16.0));
        let response = ui.add_enabled(enabled, button);
        let response = if !view.has_start_image {
            response.on_disabled_hover_text("Upload a starting keyframe first")
        } else {
            response
        };
        if response.clicked() {
            actions.push(TimelineAction::Generate);
        }

        if job.is_active() {
            ui.spinner();
        }
        if job.phase() != JobPhase::Idle {
            ui.add(
                egui::ProgressBar::new(job.progress() as f32 / 100.0)
                    .desired_width(240.0)
                    .show_percentage(),
            );
            ui.label(job.status());
        }
    });

    if let Some(error) = job.error() {
        ui.colored_label(egui::Color32::from_rgb(230, 110, 110), error);
    }

    if let Some(video) = job.video() {
        ui.separator();
        ui.horizontal(|ui| {
            if view.video_playing {
                if ui.button("⏸ Pause").clicked() {
                    actions.push(TimelineAction::Pause);
                }
            } else if ui.button("▶ Play").clicked() {
                actions.push(TimelineAction::Play);
            }
            if let Some(position) = view.video_position {
                let secs = position.as_secs();
                ui.monospace(format!("{}:{:02}", secs / 60, secs % 60));
            }
            if ui.button("⬇ Download").clicked() {
                actions.push(TimelineAction::Download);
            }
            ui.label(
                egui::RichText::new(format!(
                    "{} ({:.1} MB)",
                    video.path.display(),
                    video.size_bytes as f64 / (1024.0 * 1024.0)
                ))
                .weak(),
            );
        });
        if let Some(error) = view.playback_error {
            ui.label(egui::RichText::new(error).italics().weak());
        }
    }

    ui.separator();
    ui.horizontal(|ui| {
        for kind in [ChannelKind::Ambient, ChannelKind::Effect] {
            mixer_channel(ui, kind, view.audio, &mut actions);
            ui.separator();
        }
    });

    actions
}

fn mixer_channel(
    ui: &mut egui::Ui,
    kind: ChannelKind,
    audio: &AudioSelection,
    actions: &mut Vec<TimelineAction>,
) {
    let channel = audio.channel(kind);
    ui.label(kind.label());
    egui::ComboBox::from_id_source(("audio_track", kind.label()))
        .selected_text(channel.track.name)
        .show_ui(ui, |ui| {
            for track in kind.library() {
                if ui
                    .selectable_label(channel.track == *track, track.name)
                    .clicked()
                {
                    actions.push(TimelineAction::SelectTrack(kind, *track));
                }
            }
        });

    let mut volume = channel.volume();
    if ui
        .add(egui::Slider::new(&mut volume, 0.0..=1.0).text("Vol").show_value(false))
        .changed()
    {
        actions.push(TimelineAction::SetVolume(kind, volume));
    }
}
