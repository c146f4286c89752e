// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback through the system `ffplay` binary.
//!
//! `ffplay` has no control channel once started, so pausing kills the
//! process and remembers how far it got; playing again restarts it with a
//! seek to that position.

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use super::Playable;

pub fn is_ffplay_on_path() -> bool {
    Command::new("ffplay")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// One `ffplay`-backed media source.
pub struct FfplayPlayer {
    program: String,
    source: String,
    window_title: Option<String>,
    volume: f32,
    child: Option<Child>,
    /// Playback position accumulated before the current run
    offset: Duration,
    started_at: Option<Instant>,
}

impl FfplayPlayer {
    /// Audio-only player (no window).
    pub fn audio(source: impl Into<String>) -> Self {
        Self::with_program("ffplay", source, None)
    }

    /// Video player with its own window.
    pub fn video(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_program("ffplay", source, Some(title.into()))
    }

    pub fn with_program(
        program: impl Into<String>,
        source: impl Into<String>,
        window_title: Option<String>,
    ) -> Self {
        Self {
            program: program.into(),
            source: source.into(),
            window_title,
            volume: 1.0,
            child: None,
            offset: Duration::ZERO,
            started_at: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.child.is_some()
    }

    /// Elapsed playback position.
    pub fn position(&self) -> Duration {
        self.offset + self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Check whether the media ran to its end since the last call.
    ///
    /// `ffplay` is started with `-autoexit`, so the process exiting on its
    /// own means the end was reached.
    pub fn poll_ended(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(Some(_)) => {
                self.child = None;
                self.started_at = None;
                self.offset = Duration::ZERO;
                true
            }
            Ok(None) => false,
            Err(err) => {
                log::debug!("Lost track of ffplay for {}: {}", self.source, err);
                self.child = None;
                self.started_at = None;
                false
            }
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-autoexit".to_string(),
            "-loglevel".to_string(),
            "quiet".to_string(),
        ];
        match &self.window_title {
            Some(title) => {
                args.push("-window_title".to_string());
                args.push(title.clone());
            }
            None => args.push("-nodisp".to_string()),
        }
        if !self.offset.is_zero() {
            args.push("-ss".to_string());
            args.push(format!("{:.3}", self.offset.as_secs_f64()));
        }
        args.push("-volume".to_string());
        args.push(((self.volume * 100.0).round() as u32).to_string());
        args.push(self.source.clone());
        args
    }

    fn stop_process(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(started_at) = self.started_at.take() {
            self.offset += started_at.elapsed();
        }
    }
}

impl Playable for FfplayPlayer {
    fn play(&mut self) -> Result<()> {
        if self.child.is_some() {
            return Ok(());
        }
        let child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn {} (is it installed and on PATH?)", self.program))?;
        self.child = Some(child);
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        self.stop_process();
    }

    fn rewind(&mut self) {
        let was_playing = self.is_playing();
        self.stop_process();
        self.offset = Duration::ZERO;
        if was_playing {
            if let Err(err) = self.play() {
                log::debug!("Restart after rewind failed: {:#}", err);
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        // volume is fixed per process; restart in place to apply it now
        if self.is_playing() {
            self.stop_process();
            if let Err(err) = self.play() {
                log::debug!("Restart after volume change failed: {:#}", err);
            }
        }
    }
}

impl Drop for FfplayPlayer {
    fn drop(&mut self) {
        self.stop_process();
    }
}
