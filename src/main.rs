// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyframe Studio
//!
//! A desktop application for touching up keyframe images and directing
//! short generative video clips between them.

mod app;
mod config;
mod io;
mod job;
mod models;
mod playback;
mod prompt;
mod render;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::StudioApp;
use config::AppConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!("Ignoring unreadable .env file: {}", e);
        }
    }
    let config = AppConfig::from_env()?;

    // Backend calls and polling run here; the UI stays on the main thread
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let handle = runtime.handle().clone();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1360.0, 820.0])
            .with_min_inner_size([960.0, 640.0])
            .with_title("Keyframe Studio"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Keyframe Studio",
        options,
        Box::new(move |_cc| Ok(Box::new(StudioApp::new(&config, handle)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
