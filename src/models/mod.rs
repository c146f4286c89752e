// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for edits, direction, generation jobs and audio.

pub mod audio;
pub mod director;
pub mod generation;
pub mod history;
pub mod params;
