// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_AUDIO_LIBRARY_DIR: &str = "assets/audio";
pub const DEFAULT_UNDO_SHORTCUT: &str = "Ctrl+Z";
pub const DEFAULT_REDO_SHORTCUT: &str = "Ctrl+Shift+Z";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Key used before the user selects one in the prompt
    pub api_key: Option<String>,
    pub base_url: String,
    pub video_model: String,
    pub text_model: String,
    pub poll_interval: Duration,
    pub audio_library_dir: PathBuf,
    pub undo_shortcut: String,
    pub redo_shortcut: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            audio_library_dir: PathBuf::from(DEFAULT_AUDIO_LIBRARY_DIR),
            undo_shortcut: DEFAULT_UNDO_SHORTCUT.to_string(),
            redo_shortcut: DEFAULT_REDO_SHORTCUT.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                     | Default                                            |
    /// |-----------------------------|----------------------------------------------------|
    /// | `GEMINI_API_KEY`/`API_KEY`  | unset                                              |
    /// | `GENAI_BASE_URL`            | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `VIDEO_MODEL`               | `veo-3.1-fast-generate-preview`                    |
    /// | `TEXT_MODEL`                | `gemini-2.5-flash`                                 |
    /// | `POLL_INTERVAL_SECS`        | `10`                                               |
    /// | `AUDIO_LIBRARY_DIR`         | `assets/audio`                                     |
    /// | `UNDO_SHORTCUT`             | `Ctrl+Z`                                           |
    /// | `REDO_SHORTCUT`             | `Ctrl+Shift+Z`                                     |
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let poll_interval = match get("POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("POLL_INTERVAL_SECS must be a whole number of seconds, got {raw:?}"))?;
                anyhow::ensure!(secs > 0, "POLL_INTERVAL_SECS must be greater than zero");
                Duration::from_secs(secs)
            }
            None => defaults.poll_interval,
        };

        Ok(Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            base_url: get("GENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            video_model: get("VIDEO_MODEL").unwrap_or(defaults.video_model),
            text_model: get("TEXT_MODEL").unwrap_or(defaults.text_model),
            poll_interval,
            audio_library_dir: get("AUDIO_LIBRARY_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.audio_library_dir),
            undo_shortcut: get("UNDO_SHORTCUT").unwrap_or(defaults.undo_shortcut),
            redo_shortcut: get("REDO_SHORTCUT").unwrap_or(defaults.redo_shortcut),
        })
    }
}
