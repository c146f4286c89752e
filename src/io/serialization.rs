// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Director preset serialization and deserialization.
//!
//! This module handles saving and loading Director's Suite settings in YAML
//! and JSON formats. Imported presets are sanitized so hand-edited files
//! cannot push values out of range.

use crate::models::director::DirectorSettings;
use anyhow::{Context, Result};
use std::path::Path;

/// Export director settings to YAML format.
pub fn export_yaml(settings: &DirectorSettings, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export director settings to JSON format.
pub fn export_json(settings: &DirectorSettings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import director settings from YAML format.
pub fn import_yaml(path: &Path) -> Result<DirectorSettings> {
    let yaml = std::fs::read_to_string(path)?;
    let settings: DirectorSettings = serde_yaml::from_str(&yaml)?;
    Ok(settings.sanitized())
}

/// Import director settings from JSON format.
pub fn import_json(path: &Path) -> Result<DirectorSettings> {
    let json = std::fs::read_to_string(path)?;
    let settings: DirectorSettings = serde_json::from_str(&json)?;
    Ok(settings.sanitized())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Save a preset, choosing the format from the file extension (YAML unless `.json`).
pub fn save_preset(settings: &DirectorSettings, path: &Path) -> Result<()> {
    let result = if is_json(path) {
        export_json(settings, path)
    } else {
        export_yaml(settings, path)
    };
    result.with_context(|| format!("Failed to save preset to {}", path.display()))?;
    log::info!("Saved director preset to {}", path.display());
    Ok(())
}

/// Load a preset, choosing the format from the file extension (YAML unless `.json`).
pub fn load_preset(path: &Path) -> Result<DirectorSettings> {
    let result = if is_json(path) {
        import_json(path)
    } else {
        import_yaml(path)
    };
    let settings = result.with_context(|| format!("Failed to load preset from {}", path.display()))?;
    log::info!("Loaded director preset from {}", path.display());
    Ok(settings)
}
