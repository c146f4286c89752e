// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Prompt composition.
//!
//! Turns Director's Suite settings into the single instruction string sent to
//! the video backend. Composition is pure: the same settings always produce
//! byte-identical output.

use crate::models::director::DirectorSettings;

/// Speeds at or below this get the slow pacing clause.
pub const SLOW_SPEED_THRESHOLD: f32 = 0.5;
/// Speeds at or above this get the fast pacing clause.
pub const FAST_SPEED_THRESHOLD: f32 = 1.5;

const SLOW_PACING: &str = "very slow, deliberate, serene";
const FAST_PACING: &str = "fast-paced, high-energy, dynamic";

/// Compose the final prompt from the current settings.
pub fn compose_prompt(settings: &DirectorSettings) -> String {
    let mut prompt = settings.base_prompt.trim().to_string();

    if settings.advanced {
        prompt.push_str(" Camera: ");
        prompt.push_str(settings.camera_angle.phrase());
        prompt.push('.');

        prompt.push_str(" Motion: ");
        prompt.push_str(settings.motion_style.phrase());
        if !settings.atmosphere.is_empty() {
            let tags: Vec<&str> = settings
                .atmosphere
                .iter()
                .map(|tag| tag.display_name())
                .collect();
            prompt.push_str(", with ");
            prompt.push_str(&tags.join(", "));
        }
        prompt.push('.');
    }

    if let Some(pacing) = pacing_clause(settings.speed) {
        prompt.push_str(" Pacing: ");
        prompt.push_str(pacing);
        prompt.push('.');
    }

    if settings.motion_blur {
        prompt.push_str(" Natural cinematic motion blur.");
    }

    if settings.stabilization {
        prompt.push_str(" Smooth, stabilized camera movement.");
    }

    prompt.trim().to_string()
}

fn pacing_clause(speed: f32) -> Option<&'static str> {
    if speed <= SLOW_SPEED_THRESHOLD {
        Some(SLOW_PACING)
    } else if speed >= FAST_SPEED_THRESHOLD {
        Some(FAST_PACING)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::director::{Atmosphere, CameraAngle, MotionStyle};

    fn settings(base: &str) -> DirectorSettings {
        DirectorSettings {
            base_prompt: base.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn neutral_settings_yield_trimmed_base_text() {
        assert_eq!(compose_prompt(&settings("Test")), "Test");
        assert_eq!(compose_prompt(&settings("  Test  ")), "Test");
    }

    #[test]
    fn advanced_mode_appends_camera_then_motion() {
        let mut s = settings("A lighthouse at dusk");
        s.advanced = true;
        s.camera_angle = CameraAngle::LowAngle;
        s.motion_style = MotionStyle::Orbit;

        assert_eq!(
            compose_prompt(&s),
            "A lighthouse at dusk Camera: low-angle shot looking up at the subject. \
             Motion: orbiting camera circling the subject."
        );
    }

    #[test]
    fn atmosphere_tags_join_onto_motion_clause_in_stable_order() {
        let mut s = settings("Street");
        s.advanced = true;
        s.motion_style = MotionStyle::Tracking;
        s.toggle_atmosphere(Atmosphere::Rain);
        s.toggle_atmosphere(Atmosphere::NeonGlow);
        s.toggle_atmosphere(Atmosphere::Fog);

        assert_eq!(
            compose_prompt(&s),
            "Street Camera: eye-level shot. Motion: tracking shot following the subject, \
             with drifting fog, falling rain, neon glow."
        );
    }

    #[test]
    fn atmosphere_ignored_outside_advanced_mode() {
        let mut s = settings("Street");
        s.toggle_atmosphere(Atmosphere::Rain);
        assert_eq!(compose_prompt(&s), "Street");
    }

    #[test]
    fn speed_thresholds_are_inclusive() {
        let mut s = settings("Waves");
        s.speed = 0.5;
        assert_eq!(compose_prompt(&s), "Waves Pacing: very slow, deliberate, serene.");
        s.speed = 0.51;
        assert_eq!(compose_prompt(&s), "Waves");
        s.speed = 1.5;
        assert_eq!(compose_prompt(&s), "Waves Pacing: fast-paced, high-energy, dynamic.");
    }

    #[test]
    fn flags_append_in_order() {
        let mut s = settings("Runner");
        s.motion_blur = true;
        s.stabilization = true;
        assert_eq!(
            compose_prompt(&s),
            "Runner Natural cinematic motion blur. Smooth, stabilized camera movement."
        );
    }

    #[test]
    fn empty_base_has_no_leading_space() {
        let mut s = settings("");
        s.stabilization = true;
        assert_eq!(compose_prompt(&s), "Smooth, stabilized camera movement.");
    }

    #[test]
    fn composition_is_deterministic() {
        let mut s = settings("Forest");
        s.advanced = true;
        s.toggle_atmosphere(Atmosphere::Dust);
        s.speed = 1.8;
        s.motion_blur = true;
        assert_eq!(compose_prompt(&s), compose_prompt(&s.clone()));
    }
}
