// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the keyframe slots, the editor session,
//! the Director's Suite settings, the generation job controller and the
//! playback state, and routes panel actions between them.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;

use crate::config::AppConfig;
use crate::io::keybind::{HistoryCommand, HistoryKeys};
use crate::io::media::{self, LoadedImage, DEFAULT_VIDEO_FILENAME};
use crate::io::serialization;
use crate::job::credentials::{CredentialProvider, KeyStore};
use crate::job::veo::GenAiClient;
use crate::job::JobController;
use crate::models::director::DirectorSettings;
use crate::models::generation::ImagePayload;
use crate::playback::ffplay::{self, FfplayPlayer};
use crate::playback::{AudioSync, Playable, VideoEvent};
use crate::prompt::compose_prompt;
use crate::render::editor::KeyframeEditor;
use crate::ui::canvas;
use crate::ui::keyframes::{self, KeyframeAction, SlotId};
use crate::ui::properties::{self, DirectorAction, DirectorPanelState};
use crate::ui::timeline::{self, TimelineAction, TimelineView};
use crate::ui::toolbar::{self, EditorAction};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif"];
const JOB_REPAINT_INTERVAL: Duration = Duration::from_millis(250);

/// One keyframe slot: the current image plus the payload that will be submitted.
#[derive(Default)]
struct KeyframeSlot {
    image: Option<RgbaImage>,
    payload: Option<ImagePayload>,
    texture: Option<egui::TextureHandle>,
    /// Set when `image` changed and the thumbnail must be re-uploaded
    texture_dirty: bool,
    /// Receiver for background image loading
    loader: Option<Receiver<Result<LoadedImage, String>>>,
}

impl KeyframeSlot {
    fn set_image(&mut self, image: RgbaImage, payload: ImagePayload) {
        self.image = Some(image);
        self.payload = Some(payload);
        self.texture_dirty = true;
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The open keyframe editor and its preview texture.
struct EditorSession {
    slot: SlotId,
    editor: KeyframeEditor,
    /// Preview texture tagged with the filter revision it was uploaded from
    texture: Option<(u64, egui::TextureHandle)>,
}

/// Main application state.
pub struct StudioApp {
    slots: [KeyframeSlot; 2],
    editor: Option<EditorSession>,
    history_keys: HistoryKeys,

    director: DirectorSettings,
    director_panel: DirectorPanelState,
    /// Receiver for the in-flight Director AI suggestion
    suggestion: Option<Receiver<Result<String, String>>>,

    jobs: JobController,
    genai: Arc<GenAiClient>,
    keys: Arc<KeyStore>,
    key_input: String,
    runtime: tokio::runtime::Handle,

    audio: AudioSync,
    video: Option<FfplayPlayer>,
    playback_error: Option<String>,

    /// Last user-facing notice (validation errors, save results)
    notice: Option<String>,
}

impl StudioApp {
    /// Create a new application instance.
    pub fn new(config: &AppConfig, runtime: tokio::runtime::Handle) -> Self {
        let keys = KeyStore::new(config.api_key.clone());
        let genai = Arc::new(GenAiClient::new(
            config.base_url.clone(),
            config.video_model.clone(),
            config.text_model.clone(),
            keys.clone(),
        ));
        let credentials: Arc<dyn CredentialProvider> = keys.clone();
        let jobs = JobController::new(
            genai.clone(),
            Some(credentials),
            runtime.clone(),
            config.poll_interval,
            std::env::temp_dir().join("keyframe-studio"),
        );

        if !ffplay::is_ffplay_on_path() {
            log::warn!("ffplay was not found on PATH; video and audio playback are unavailable");
        }

        Self {
            slots: Default::default(),
            editor: None,
            history_keys: HistoryKeys::new(&config.undo_shortcut, &config.redo_shortcut),
            director: DirectorSettings::default(),
            director_panel: DirectorPanelState::default(),
            suggestion: None,
            jobs,
            genai,
            keys,
            key_input: String::new(),
            runtime,
            audio: AudioSync::with_ffplay(config.audio_library_dir.clone()),
            video: None,
            playback_error: None,
            notice: None,
        }
    }

    fn slot(&mut self, id: SlotId) -> &mut KeyframeSlot {
        &mut self.slots[id.index()]
    }

    /// Load an image file into a slot (asynchronously).
    fn load_keyframe(&mut self, id: SlotId, path: PathBuf) {
        let (sender, receiver) = channel();
        self.slot(id).loader = Some(receiver);

        // Spawn background thread for loading
        std::thread::spawn(move || {
            let result = media::load_image(&path).map_err(|e| format!("Failed to load image: {}", e));
            if let Ok(loaded) = &result {
                log::info!(
                    "Loaded keyframe: {} ({}x{})",
                    path.display(),
                    loaded.width,
                    loaded.height
                );
            }
            let _ = sender.send(result);
        });
    }

    /// Check slots for completed background loads.
    fn poll_loaders(&mut self) {
        for id in SlotId::ALL {
            let slot = &mut self.slots[id.index()];
            let Some(receiver) = slot.loader.as_ref() else {
                continue;
            };
            let Ok(result) = receiver.try_recv() else {
                continue;
            };
            slot.loader = None;

            match result {
                Ok(loaded) => {
                    slot.set_image(loaded.image, loaded.payload);
                    // an editor open on the old image no longer applies
                    if self.editor.as_ref().is_some_and(|s| s.slot == id) {
                        self.editor = None;
                    }
                }
                Err(e) => {
                    log::error!("{}", e);
                    self.notice = Some(e);
                }
            }
        }
    }

    fn refresh_textures(&mut self, ctx: &egui::Context) {
        for id in SlotId::ALL {
            let slot = &mut self.slots[id.index()];
            if !slot.texture_dirty {
                continue;
            }
            slot.texture_dirty = false;
            slot.texture = slot
                .image
                .as_ref()
                .map(|image| texture_from(ctx, &format!("keyframe_{}", id.index()), image));
        }
    }

    fn handle_keyframe_action(&mut self, action: KeyframeAction, ctx: &egui::Context) {
        match action {
            KeyframeAction::Load(id) => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file()
                {
                    self.load_keyframe(id, path);
                }
            }
            KeyframeAction::Edit(id) => {
                if let Some(image) = self.slot(id).image.clone() {
                    log::info!("Editing {}", id.label());
                    self.editor = Some(EditorSession {
                        slot: id,
                        editor: KeyframeEditor::new(image),
                        texture: None,
                    });
                }
            }
            KeyframeAction::Clear(id) => {
                if self.editor.as_ref().is_some_and(|s| s.slot == id) {
                    self.editor = None;
                }
                self.slot(id).clear();
            }
            KeyframeAction::CopyDataUrl(id) => {
                if let Some(payload) = &self.slots[id.index()].payload {
                    ctx.copy_text(media::to_data_url(payload));
                    log::info!("Copied {} to the clipboard", id.label());
                }
            }
        }
    }

    // ---- keyframe editor ----

    fn show_editor(&mut self, ctx: &egui::Context) {
        let Some(session) = self.editor.as_mut() else {
            return;
        };

        let revision = session.editor.revision();
        if session.texture.as_ref().map(|(r, _)| *r) != Some(revision) {
            let texture = texture_from(ctx, "editor_preview", session.editor.filtered());
            session.texture = Some((revision, texture));
        }

        let shake_offset = if session.editor.is_shaking() {
            ctx.request_repaint();
            session.editor.tick_shake(&mut rand::rng())
        } else {
            [0.0, 0.0]
        };

        let keys = self.history_keys;
        let mut open = true;
        let session = &*session;
        let mut actions = egui::Window::new(format!("Edit {}", session.slot.label()))
            .id(egui::Id::new("keyframe_editor"))
            .open(&mut open)
            .collapsible(false)
            .default_size([980.0, 620.0])
            .show(ctx, |ui| {
                let Some((_, texture)) = session.texture.as_ref() else {
                    return Vec::new();
                };
                ui.horizontal_top(|ui| {
                    let actions = ui
                        .vertical(|ui| {
                            ui.set_width(300.0);
                            egui::ScrollArea::vertical()
                                .show(ui, |ui| toolbar::show(ui, &session.editor, &keys))
                                .inner
                        })
                        .inner;
                    ui.allocate_ui(egui::vec2(640.0, 540.0), |ui| {
                        canvas::show(ui, &session.editor, texture, shake_offset);
                    });
                    actions
                })
                .inner
            })
            .and_then(|response| response.inner)
            .unwrap_or_default();

        match keys.consume(ctx) {
            Some(HistoryCommand::Undo) => actions.push(EditorAction::Undo),
            Some(HistoryCommand::Redo) => actions.push(EditorAction::Redo),
            None => {}
        }
        if !open {
            actions.push(EditorAction::Cancel);
        }

        self.apply_editor_actions(actions);
    }

    fn apply_editor_actions(&mut self, actions: Vec<EditorAction>) {
        for action in actions {
            let Some(session) = self.editor.as_mut() else {
                return;
            };
            match action {
                EditorAction::Update { patch, commit } => session.editor.update(&patch, commit),
                EditorAction::BeginDrag => session.editor.begin_drag(),
                EditorAction::EndDrag => {
                    session.editor.end_drag();
                }
                EditorAction::Undo => {
                    if session.editor.undo() {
                        log::debug!("Undo");
                    }
                }
                EditorAction::Redo => {
                    if session.editor.redo() {
                        log::debug!("Redo");
                    }
                }
                EditorAction::Reset => session.editor.reset(),
                EditorAction::Apply => {
                    self.apply_edit();
                    return;
                }
                EditorAction::Cancel => {
                    self.editor = None;
                    return;
                }
            }
        }
    }

    /// Export the edited keyframe back into its slot and close the editor.
    fn apply_edit(&mut self) {
        let Some(session) = self.editor.take() else {
            return;
        };
        match session.editor.export(self.director.aspect_ratio) {
            Ok(exported) => {
                self.slot(session.slot)
                    .set_image(exported.image, exported.payload);
            }
            Err(e) => {
                log::error!("Failed to export keyframe: {}", e);
                self.notice = Some(format!("Failed to export keyframe: {}", e));
                self.editor = Some(session);
            }
        }
    }

    // ---- generation ----

    fn submit_generation(&mut self) {
        let prompt = compose_prompt(&self.director);
        let start = self.slots[SlotId::Start.index()].payload.clone();
        let end = self.slots[SlotId::End.index()].payload.clone();

        match self.jobs.submit(
            prompt,
            start,
            end,
            self.director.aspect_ratio,
            self.director.resolution,
        ) {
            Ok(()) => {
                self.notice = None;
                self.video = None;
                self.playback_error = None;
                self.audio.handle(VideoEvent::Pause);
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn poll_job(&mut self, ctx: &egui::Context) {
        if self.jobs.pump() {
            if let Some(video) = self.jobs.job().video() {
                if self.video.is_none() {
                    self.video = Some(FfplayPlayer::video(
                        video.path.to_string_lossy(),
                        "Keyframe Studio - Preview",
                    ));
                }
            }
        }
        if self.jobs.job().is_active() {
            ctx.request_repaint_after(JOB_REPAINT_INTERVAL);
        }
    }

    fn poll_playback(&mut self, ctx: &egui::Context) {
        let Some(video) = self.video.as_mut() else {
            return;
        };
        if video.poll_ended() {
            self.audio.handle(VideoEvent::Ended);
        } else if video.is_playing() {
            ctx.request_repaint_after(JOB_REPAINT_INTERVAL);
        }
    }

    fn handle_timeline_action(&mut self, action: TimelineAction) {
        match action {
            TimelineAction::Generate => self.submit_generation(),
            TimelineAction::Play => {
                let Some(video) = self.video.as_mut() else {
                    return;
                };
                match video.play() {
                    Ok(()) => {
                        self.playback_error = None;
                        self.audio.handle(VideoEvent::Play);
                    }
                    Err(e) => {
                        log::debug!("Video playback failed: {:#}", e);
                        self.playback_error = Some(format!("Playback unavailable: {:#}", e));
                    }
                }
            }
            TimelineAction::Pause => {
                if let Some(video) = self.video.as_mut() {
                    video.pause();
                }
                self.audio.handle(VideoEvent::Pause);
            }
            TimelineAction::Download => self.download_video(),
            TimelineAction::SelectTrack(kind, track) => self.audio.select(kind, track),
            TimelineAction::SetVolume(kind, volume) => self.audio.set_volume(kind, volume),
        }
    }

    fn download_video(&mut self) {
        let Some(video) = self.jobs.job().video() else {
            return;
        };
        let Some(destination) = rfd::FileDialog::new()
            .add_filter("MP4 video", &["mp4"])
            .set_file_name(DEFAULT_VIDEO_FILENAME)
            .save_file()
        else {
            return;
        };

        match media::save_video(&video.path, &destination) {
            Ok(bytes) => {
                log::info!("Saved video to {} ({} bytes)", destination.display(), bytes);
                self.notice = Some(format!("Saved {}", destination.display()));
            }
            Err(e) => {
                log::error!("Failed to save video: {}", e);
                self.notice = Some(format!("Failed to save video: {}", e));
            }
        }
    }

    // ---- director ----

    fn handle_director_action(&mut self, action: DirectorAction, ctx: &egui::Context) {
        match action {
            DirectorAction::None => {}
            DirectorAction::Suggest(idea) => self.request_suggestion(idea, ctx),
            DirectorAction::SavePreset => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("YAML", &["yaml", "yml"])
                    .add_filter("JSON", &["json"])
                    .set_file_name("director-preset.yaml")
                    .save_file()
                {
                    if let Err(e) = serialization::save_preset(&self.director, &path) {
                        log::error!("{:#}", e);
                        self.notice = Some(format!("{:#}", e));
                    }
                }
            }
            DirectorAction::LoadPreset => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Presets", &["yaml", "yml", "json"])
                    .pick_file()
                {
                    match serialization::load_preset(&path) {
                        Ok(settings) => self.director = settings,
                        Err(e) => {
                            log::error!("{:#}", e);
                            self.notice = Some(format!("{:#}", e));
                        }
                    }
                }
            }
        }
    }

    fn request_suggestion(&mut self, idea: String, ctx: &egui::Context) {
        let (sender, receiver) = channel();
        self.suggestion = Some(receiver);
        self.director_panel.suggesting = true;
        self.director_panel.suggestion_error = None;

        let client = self.genai.clone();
        let keys = self.keys.clone();
        let settings = self.director.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            if !keys.has_selected_key().await {
                keys.open_select_key().await;
            }
            let result = match client.suggest_prompt(&idea, &settings).await {
                Ok(text) => Ok(text),
                Err(e) => {
                    if e.is_credential_error() {
                        keys.reset_selection();
                    }
                    Err(e.to_string())
                }
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    fn poll_suggestion(&mut self) {
        let Some(receiver) = self.suggestion.as_ref() else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.suggestion = None;
        self.director_panel.suggesting = false;

        match result {
            Ok(text) => {
                log::info!("Director AI suggested a prompt");
                self.director.base_prompt = text;
            }
            Err(e) => {
                log::error!("Prompt suggestion failed: {}", e);
                self.director_panel.suggestion_error = Some(e);
            }
        }
    }

    // ---- credentials ----

    fn show_key_prompt(&mut self, ctx: &egui::Context) {
        if !self.keys.wants_prompt() {
            return;
        }
        // the prompt may be opened from a background task
        ctx.request_repaint_after(JOB_REPAINT_INTERVAL);

        egui::Window::new("Select API key")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Enter a Gemini API key with access to video generation.");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.key_input)
                        .password(true)
                        .hint_text("API key")
                        .desired_width(320.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    if ui.button("Use key").clicked() || submitted {
                        if self.keys.select_key(&self.key_input) {
                            self.key_input.clear();
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        self.key_input.clear();
                        self.keys.dismiss_prompt();
                    }
                });
            });
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loaders();
        self.refresh_textures(ctx);
        self.poll_job(ctx);
        self.poll_suggestion();
        self.poll_playback(ctx);

        if self.slots.iter().any(|s| s.loader.is_some()) || self.director_panel.suggesting {
            ctx.request_repaint_after(JOB_REPAINT_INTERVAL);
        }

        // Top menu bar
        let mut keyframe_action = None;
        let mut director_action = DirectorAction::None;
        let mut download = false;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    for id in SlotId::ALL {
                        if ui.button(format!("Upload {}...", id.label())).clicked() {
                            keyframe_action = Some(KeyframeAction::Load(id));
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    if ui.button("Load Director Preset...").clicked() {
                        director_action = DirectorAction::LoadPreset;
                        ui.close_menu();
                    }
                    if ui.button("Save Director Preset...").clicked() {
                        director_action = DirectorAction::SavePreset;
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_video = self.jobs.job().video().is_some();
                    if ui
                        .add_enabled(has_video, egui::Button::new("Download Video..."))
                        .clicked()
                    {
                        download = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Settings", |ui| {
                    if ui.button("Change API Key...").clicked() {
                        self.keys.request_prompt();
                        ui.close_menu();
                    }
                });
            });
        });

        // Generation panel (bottom)
        let timeline_actions = egui::TopBottomPanel::bottom("generation")
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                timeline::show(
                    ui,
                    TimelineView {
                        job: self.jobs.job(),
                        has_start_image: self.slots[SlotId::Start.index()].payload.is_some(),
                        video_playing: self.video.as_ref().is_some_and(|v| v.is_playing()),
                        video_position: self.video.as_ref().map(|v| v.position()),
                        playback_error: self.playback_error.as_deref(),
                        audio: self.audio.selection(),
                    },
                )
            })
            .inner;

        // Director's Suite (right side)
        let panel_action = egui::SidePanel::right("director")
            .default_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .show(ui, |ui| {
                        properties::show(ui, &mut self.director, &mut self.director_panel)
                    })
                    .inner
            })
            .inner;
        if panel_action != DirectorAction::None {
            director_action = panel_action;
        }

        // Keyframe slots (center)
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Keyframes");
            if let Some(notice) = &self.notice {
                ui.label(egui::RichText::new(notice).color(egui::Color32::from_rgb(240, 190, 90)));
            }
            ui.add_space(8.0);
            ui.horizontal_wrapped(|ui| {
                for id in SlotId::ALL {
                    let slot = &self.slots[id.index()];
                    if let Some(action) =
                        keyframes::show_slot(ui, id, slot.texture.as_ref(), slot.loader.is_some())
                    {
                        keyframe_action = Some(action);
                    }
                }
            });
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(
                    "Edits are exported at the selected aspect ratio when you press Apply.",
                )
                .italics()
                .weak(),
            );
        });

        if let Some(action) = keyframe_action {
            self.handle_keyframe_action(action, ctx);
        }
        self.handle_director_action(director_action, ctx);
        for action in timeline_actions {
            self.handle_timeline_action(action);
        }
        if download {
            self.download_video();
        }

        self.show_editor(ctx);
        self.show_key_prompt(ctx);
    }
}

/// Upload an RGBA image as an egui texture.
fn texture_from(ctx: &egui::Context, name: &str, image: &RgbaImage) -> egui::TextureHandle {
    let size = [image.width() as usize, image.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
}
