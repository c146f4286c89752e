// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Audio channels synchronized with the generated video.
//!
//! [`AudioSync`] owns one player per channel and mirrors the video
//! player's play, pause and end events onto both. Channel playback errors
//! never reach the user; they are logged at debug level and dropped.

pub mod ffplay;

use std::path::PathBuf;

use crate::models::audio::{AudioSelection, AudioTrack, ChannelKind};

/// Something that can be played, paused and rewound.
pub trait Playable {
    fn play(&mut self) -> anyhow::Result<()>;
    fn pause(&mut self);
    /// Seek back to the start without changing play state.
    fn rewind(&mut self);
    fn set_volume(&mut self, volume: f32);
}

/// Video player lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEvent {
    Play,
    Pause,
    Ended,
}

type PlayerFactory = Box<dyn FnMut(&str) -> Box<dyn Playable>>;

/// Ambient and effect channels bound to the video player's lifecycle.
pub struct AudioSync {
    library_dir: PathBuf,
    factory: PlayerFactory,
    selection: AudioSelection,
    ambient: Option<Box<dyn Playable>>,
    effect: Option<Box<dyn Playable>>,
    video_playing: bool,
}

impl AudioSync {
    pub fn new(library_dir: PathBuf, factory: PlayerFactory) -> Self {
        Self {
            library_dir,
            factory,
            selection: AudioSelection::default(),
            ambient: None,
            effect: None,
            video_playing: false,
        }
    }

    /// Channels played through `ffplay`.
    pub fn with_ffplay(library_dir: PathBuf) -> Self {
        Self::new(
            library_dir,
            Box::new(|source| Box::new(ffplay::FfplayPlayer::audio(source))),
        )
    }

    pub fn selection(&self) -> &AudioSelection {
        &self.selection
    }

    /// Swap the track on one channel. A silent entry leaves the channel empty.
    pub fn select(&mut self, kind: ChannelKind, track: AudioTrack) {
        if self.selection.channel(kind).track == track {
            return;
        }
        self.selection.channel_mut(kind).track = track;

        let volume = self.selection.channel(kind).volume();
        let mut player = track.resolve(&self.library_dir).map(|source| {
            let mut player = (self.factory)(&source);
            player.set_volume(volume);
            player
        });
        if self.video_playing {
            if let Some(player) = player.as_mut() {
                start(kind, player.as_mut());
            }
        }
        // dropping the old player stops it
        *self.slot(kind) = player;
    }

    /// Change a channel's volume, effective immediately whether or not it is playing.
    pub fn set_volume(&mut self, kind: ChannelKind, volume: f32) {
        self.selection.channel_mut(kind).set_volume(volume);
        let volume = self.selection.channel(kind).volume();
        if let Some(player) = self.slot(kind).as_mut() {
            player.set_volume(volume);
        }
    }

    pub fn handle(&mut self, event: VideoEvent) {
        log::debug!("Video event: {:?}", event);
        match event {
            VideoEvent::Play => {
                self.video_playing = true;
                for kind in [ChannelKind::Ambient, ChannelKind::Effect] {
                    if let Some(player) = self.slot(kind).as_mut() {
                        start(kind, player.as_mut());
                    }
                }
            }
            VideoEvent::Pause => {
                self.video_playing = false;
                self.each_player(|player| player.pause());
            }
            VideoEvent::Ended => {
                self.video_playing = false;
                self.each_player(|player| {
                    player.pause();
                    player.rewind();
                });
            }
        }
    }

    fn slot(&mut self, kind: ChannelKind) -> &mut Option<Box<dyn Playable>> {
        match kind {
            ChannelKind::Ambient => &mut self.ambient,
            ChannelKind::Effect => &mut self.effect,
        }
    }

    fn each_player(&mut self, mut f: impl FnMut(&mut dyn Playable)) {
        for player in [self.ambient.as_mut(), self.effect.as_mut()]
            .into_iter()
            .flatten()
        {
            f(player.as_mut());
        }
    }
}

fn start(kind: ChannelKind, player: &mut dyn Playable) {
    if let Err(err) = player.play() {
        log::debug!("{} channel failed to start: {:#}", kind.label(), err);
    }
}
