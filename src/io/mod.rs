// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for media files, presets and keyboard shortcuts.

pub mod keybind;
pub mod media;
pub mod serialization;
