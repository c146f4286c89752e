// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Audio library entries and channel selections.

use std::path::{Path, PathBuf};

/// An entry in one of the static audio libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTrack {
    pub id: &'static str,
    pub name: &'static str,
    /// Source relative to the audio library directory. Empty means silence.
    pub source: &'static str,
}

impl AudioTrack {
    pub fn is_silent(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Resolve the source against the library directory. URLs pass through.
    pub fn resolve(&self, library_dir: &Path) -> Option<String> {
        if self.is_silent() {
            return None;
        }
        if self.source.contains("://") {
            return Some(self.source.to_string());
        }
        let path: PathBuf = library_dir.join(self.source);
        Some(path.to_string_lossy().into_owned())
    }
}

pub const SILENCE: AudioTrack = AudioTrack {
    id: "none",
    name: "None",
    source: "",
};

pub const AMBIENT_LIBRARY: &[AudioTrack] = &[
    SILENCE,
    AudioTrack {
        id: "cinematic-drone",
        name: "Cinematic Drone",
        source: "ambient/cinematic-drone.mp3",
    },
    AudioTrack {
        id: "lofi-dusk",
        name: "Lo-fi Dusk",
        source: "ambient/lofi-dusk.mp3",
    },
    AudioTrack {
        id: "orchestral-rise",
        name: "Orchestral Rise",
        source: "ambient/orchestral-rise.mp3",
    },
    AudioTrack {
        id: "synthwave-night",
        name: "Synthwave Night",
        source: "ambient/synthwave-night.mp3",
    },
];

pub const EFFECT_LIBRARY: &[AudioTrack] = &[
    SILENCE,
    AudioTrack {
        id: "ocean-waves",
        name: "Ocean Waves",
        source: "effects/ocean-waves.mp3",
    },
    AudioTrack {
        id: "city-traffic",
        name: "City Traffic",
        source: "effects/city-traffic.mp3",
    },
    AudioTrack {
        id: "forest-birds",
        name: "Forest Birds",
        source: "effects/forest-birds.mp3",
    },
    AudioTrack {
        id: "thunderstorm",
        name: "Thunderstorm",
        source: "effects/thunderstorm.mp3",
    },
];

/// Which playback channel a selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Ambient,
    Effect,
}

impl ChannelKind {
    pub fn library(self) -> &'static [AudioTrack] {
        match self {
            Self::Ambient => AMBIENT_LIBRARY,
            Self::Effect => EFFECT_LIBRARY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ambient => "Ambient music",
            Self::Effect => "Sound effect",
        }
    }
}

/// One channel's selection: a library entry plus its own volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSelection {
    pub track: AudioTrack,
    volume: f32,
}

impl ChannelSelection {
    pub fn new(track: AudioTrack, volume: f32) -> Self {
        Self {
            track,
            volume: clamp_volume(volume),
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }
}

/// Ambient and effect selections, independent of each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSelection {
    pub ambient: ChannelSelection,
    pub effect: ChannelSelection,
}

impl Default for AudioSelection {
    fn default() -> Self {
        Self {
            ambient: ChannelSelection::new(SILENCE, 0.5),
            effect: ChannelSelection::new(SILENCE, 0.5),
        }
    }
}

impl AudioSelection {
    pub fn channel(&self, kind: ChannelKind) -> &ChannelSelection {
        match kind {
            ChannelKind::Ambient => &self.ambient,
            ChannelKind::Effect => &self.effect,
        }
    }

    pub fn channel_mut(&mut self, kind: ChannelKind) -> &mut ChannelSelection {
        match kind {
            ChannelKind::Ambient => &mut self.ambient,
            ChannelKind::Effect => &mut self.effect,
        }
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_resolves_to_nothing() {
        assert!(SILENCE.is_silent());
        assert_eq!(SILENCE.resolve(Path::new("/audio")), None);
    }

    #[test]
    fn relative_sources_resolve_against_library() {
        let track = ChannelKind::Effect
            .library()
            .iter()
            .find(|track| track.id == "ocean-waves")
            .unwrap();
        let resolved = track.resolve(Path::new("/audio")).unwrap();
        assert!(resolved.ends_with("effects/ocean-waves.mp3"));
        assert!(resolved.starts_with("/audio"));
    }

    #[test]
    fn url_sources_pass_through() {
        let track = AudioTrack {
            id: "remote",
            name: "Remote",
            source: "https://example.com/a.mp3",
        };
        assert_eq!(
            track.resolve(Path::new("/audio")).as_deref(),
            Some("https://example.com/a.mp3")
        );
    }

    #[test]
    fn volumes_are_clamped_and_independent() {
        let mut selection = AudioSelection::default();
        selection.channel_mut(ChannelKind::Ambient).set_volume(3.0);
        selection.channel_mut(ChannelKind::Effect).set_volume(-1.0);
        assert_eq!(selection.ambient.volume(), 1.0);
        assert_eq!(selection.effect.volume(), 0.0);
    }

    #[test]
    fn every_library_starts_with_silence() {
        for kind in [ChannelKind::Ambient, ChannelKind::Effect] {
            assert_eq!(kind.library()[0], SILENCE);
        }
    }
}
