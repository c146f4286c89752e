// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Director's Suite settings.
//!
//! Everything the user picks in the Director's Suite panel: the base prompt,
//! advanced camera/motion/atmosphere choices, pacing, and output format.
//! Settings serialize so they can be saved and reloaded as presets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::generation::{AspectRatio, Resolution};

pub const SPEED_RANGE: (f32, f32) = (0.25, 2.0);

/// Camera angle used when advanced mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAngle {
    #[default]
    EyeLevel,
    LowAngle,
    HighAngle,
    BirdsEye,
    DutchAngle,
    OverTheShoulder,
    ExtremeCloseUp,
    WideEstablishing,
}

impl CameraAngle {
    pub const ALL: [Self; 8] = [
        Self::EyeLevel,
        Self::LowAngle,
        Self::HighAngle,
        Self::BirdsEye,
        Self::DutchAngle,
        Self::OverTheShoulder,
        Self::ExtremeCloseUp,
        Self::WideEstablishing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::EyeLevel => "Eye Level",
            Self::LowAngle => "Low Angle",
            Self::HighAngle => "High Angle",
            Self::BirdsEye => "Bird's Eye",
            Self::DutchAngle => "Dutch Angle",
            Self::OverTheShoulder => "Over the Shoulder",
            Self::ExtremeCloseUp => "Extreme Close-Up",
            Self::WideEstablishing => "Wide Establishing",
        }
    }

    /// Phrase inserted into the composed prompt.
    pub fn phrase(self) -> &'static str {
        match self {
            Self::EyeLevel => "eye-level shot",
            Self::LowAngle => "low-angle shot looking up at the subject",
            Self::HighAngle => "high-angle shot looking down on the subject",
            Self::BirdsEye => "bird's-eye view from directly above",
            Self::DutchAngle => "dutch angle with a tilted horizon",
            Self::OverTheShoulder => "over-the-shoulder framing",
            Self::ExtremeCloseUp => "extreme close-up",
            Self::WideEstablishing => "wide establishing shot",
        }
    }
}

/// Camera movement used when advanced mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionStyle {
    #[default]
    SlowPushIn,
    PullBack,
    Orbit,
    PanLeft,
    PanRight,
    Tracking,
    CraneUp,
    Handheld,
    StaticLocked,
}

impl MotionStyle {
    pub const ALL: [Self; 9] = [
        Self::SlowPushIn,
        Self::PullBack,
        Self::Orbit,
        Self::PanLeft,
        Self::PanRight,
        Self::Tracking,
        Self::CraneUp,
        Self::Handheld,
        Self::StaticLocked,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::SlowPushIn => "Slow Push-In",
            Self::PullBack => "Pull Back",
            Self::Orbit => "Orbit",
            Self::PanLeft => "Pan Left",
            Self::PanRight => "Pan Right",
            Self::Tracking => "Tracking",
            Self::CraneUp => "Crane Up",
            Self::Handheld => "Handheld",
            Self::StaticLocked => "Locked-Off",
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Self::SlowPushIn => "slow push-in toward the subject",
            Self::PullBack => "smooth pull-back revealing the scene",
            Self::Orbit => "orbiting camera circling the subject",
            Self::PanLeft => "steady pan to the left",
            Self::PanRight => "steady pan to the right",
            Self::Tracking => "tracking shot following the subject",
            Self::CraneUp => "crane shot rising upward",
            Self::Handheld => "handheld camera with organic movement",
            Self::StaticLocked => "locked-off static camera",
        }
    }
}

/// Atmosphere tags. Declaration order is the order they appear in prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Atmosphere {
    GoldenHour,
    Fog,
    Rain,
    Snow,
    NeonGlow,
    Dust,
    Embers,
    Moonlight,
}

impl Atmosphere {
    pub const ALL: [Self; 8] = [
        Self::GoldenHour,
        Self::Fog,
        Self::Rain,
        Self::Snow,
        Self::NeonGlow,
        Self::Dust,
        Self::Embers,
        Self::Moonlight,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::GoldenHour => "golden hour light",
            Self::Fog => "drifting fog",
            Self::Rain => "falling rain",
            Self::Snow => "gentle snowfall",
            Self::NeonGlow => "neon glow",
            Self::Dust => "floating dust motes",
            Self::Embers => "glowing embers",
            Self::Moonlight => "cool moonlight",
        }
    }
}

/// A named starting prompt offered in the preset picker.
#[derive(Debug, Clone, Copy)]
pub struct PromptPreset {
    pub name: &'static str,
    pub text: &'static str,
}

pub const PROMPT_PRESETS: &[PromptPreset] = &[
    PromptPreset {
        name: "Cinematic Reveal",
        text: "A cinematic reveal of the scene, the subject slowly coming into focus",
    },
    PromptPreset {
        name: "Living Portrait",
        text: "The subject breathes and blinks naturally, hair moving softly in a light breeze",
    },
    PromptPreset {
        name: "Epic Landscape",
        text: "A sweeping view across the landscape as clouds drift and light shifts across the terrain",
    },
    PromptPreset {
        name: "Product Spotlight",
        text: "The product rotates gently on a clean surface under soft studio lighting",
    },
    PromptPreset {
        name: "Dreamlike Transition",
        text: "The first frame gradually transforms into the last frame in a surreal, dreamlike morph",
    },
];

/// Complete Director's Suite state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorSettings {
    pub base_prompt: String,
    pub advanced: bool,
    pub camera_angle: CameraAngle,
    pub motion_style: MotionStyle,
    pub atmosphere: BTreeSet<Atmosphere>,
    pub speed: f32,
    pub motion_blur: bool,
    pub stabilization: bool,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            base_prompt: PROMPT_PRESETS[0].text.to_string(),
            advanced: false,
            camera_angle: CameraAngle::default(),
            motion_style: MotionStyle::default(),
            atmosphere: BTreeSet::new(),
            speed: 1.0,
            motion_blur: false,
            stabilization: false,
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
        }
    }
}

impl DirectorSettings {
    /// Toggle an atmosphere tag on or off.
    pub fn toggle_atmosphere(&mut self, tag: Atmosphere) {
        if !self.atmosphere.remove(&tag) {
            self.atmosphere.insert(tag);
        }
    }

    /// Clamp values that may have come from a hand-edited preset file.
    pub fn sanitized(mut self) -> Self {
        self.speed = if self.speed.is_finite() {
            self.speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1)
        } else {
            1.0
        };
        self
    }
}
