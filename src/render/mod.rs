// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyframe render pipeline: color filters, preview transforms and export.

pub mod editor;
pub mod export;
pub mod filters;
pub mod preview;
