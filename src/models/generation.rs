// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Generation request and job state.
//!
//! A [`GenerationRequest`] is assembled fresh for each submission. A
//! [`GenerationJob`] tracks one submission through its lifecycle; it is only
//! mutated by applying [`JobUpdate`]s, and replaced wholesale by the next
//! submission.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub const ALL: [Self; 2] = [Self::Landscape, Self::Portrait];

    /// Wire value understood by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        match self {
            Self::Landscape => 16.0 / 9.0,
            Self::Portrait => 9.0 / 16.0,
        }
    }
}

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Resolution {
    pub const ALL: [Self; 2] = [Self::Hd720, Self::Hd1080];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hd720 => "720p",
            Self::Hd1080 => "1080p",
        }
    }
}

/// Encoded image bytes ready to send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Base64-encoded image bytes (no data URL prefix)
    pub data: String,
}

/// Reasons a submission is rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please upload a starting image before generating.")]
    MissingStartImage,

    #[error("A generation is already in progress.")]
    JobInFlight,
}

/// Everything needed for one generation submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub start_image: ImagePayload,
    pub end_image: Option<ImagePayload>,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
}

impl GenerationRequest {
    /// Assemble a request, rejecting it when no starting image is present.
    pub fn new(
        prompt: String,
        start_image: Option<ImagePayload>,
        end_image: Option<ImagePayload>,
        aspect_ratio: AspectRatio,
        resolution: Resolution,
    ) -> Result<Self, ValidationError> {
        let start_image = start_image.ok_or(ValidationError::MissingStartImage)?;
        Ok(Self {
            prompt,
            start_image,
            end_image,
            aspect_ratio,
            resolution,
        })
    }
}

/// A finished clip stored locally for playback and download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVideo {
    pub path: PathBuf,
    pub size_bytes: usize,
}

/// Lifecycle phase of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Submitted,
    Polling,
    Succeeded,
    Failed,
}

/// Why a job failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub message: String,
    /// The backend rejected the active API key
    pub credential_rejected: bool,
}

/// Progress reports from the job driver.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    /// The backend accepted the request and returned an incomplete operation
    Accepted,
    /// A poll tick found the operation still running
    StillRunning,
    Succeeded(GeneratedVideo),
    Failed(JobFailure),
}

/// Rotating status messages shown while polling.
pub const POLLING_MESSAGES: &[&str] = &[
    "Analyzing your keyframes...",
    "Blocking out the camera move...",
    "Rendering motion between frames...",
    "Grading color and light...",
    "Polishing the final frames...",
];

pub const SUBMITTED_MESSAGE: &str = "Sending your request to the studio...";
pub const SUCCEEDED_MESSAGE: &str = "Your clip is ready.";
pub const FAILED_MESSAGE: &str = "Generation failed.";

const ACCEPTED_PROGRESS: u8 = 10;
const PROGRESS_STEP: u8 = 8;
/// Synthetic progress never reaches 100 until the backend reports completion.
const PROGRESS_CEILING: u8 = 95;

/// State of the current (or last) generation job.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    phase: JobPhase,
    status: String,
    progress: u8,
    message_index: usize,
    video: Option<GeneratedVideo>,
    error: Option<String>,
}

impl Default for GenerationJob {
    fn default() -> Self {
        Self {
            phase: JobPhase::Idle,
            status: String::new(),
            progress: 0,
            message_index: 0,
            video: None,
            error: None,
        }
    }
}

impl GenerationJob {
    /// A brand-new job that has just been submitted.
    pub fn submitted() -> Self {
        Self {
            phase: JobPhase::Submitted,
            status: SUBMITTED_MESSAGE.to_string(),
            ..Default::default()
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn video(&self) -> Option<&GeneratedVideo> {
        self.video.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while the backend is working on this job.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, JobPhase::Submitted | JobPhase::Polling)
    }

    /// Submission is allowed from Idle, Succeeded and Failed.
    pub fn can_submit(&self) -> bool {
        !self.is_active()
    }

    /// Apply a driver update. Returns false when the update does not fit the
    /// current phase and was ignored.
    pub fn apply(&mut self, update: JobUpdate) -> bool {
        if !self.is_active() {
            return false;
        }

        match update {
            JobUpdate::Accepted => {
                if self.phase != JobPhase::Submitted {
                    return false;
                }
                self.phase = JobPhase::Polling;
                self.message_index = 0;
                self.status = POLLING_MESSAGES[0].to_string();
                self.progress = self.progress.max(ACCEPTED_PROGRESS);
            }
            JobUpdate::StillRunning => {
                if self.phase == JobPhase::Submitted {
                    self.phase = JobPhase::Polling;
                    self.progress = self.progress.max(ACCEPTED_PROGRESS);
                }
                self.message_index = (self.message_index + 1) % POLLING_MESSAGES.len();
                self.status = POLLING_MESSAGES[self.message_index].to_string();
                self.progress = self
                    .progress
                    .saturating_add(PROGRESS_STEP)
                    .min(PROGRESS_CEILING);
            }
            JobUpdate::Succeeded(video) => {
                self.phase = JobPhase::Succeeded;
                self.status = SUCCEEDED_MESSAGE.to_string();
                self.progress = 100;
                self.video = Some(video);
            }
            JobUpdate::Failed(failure) => {
                self.phase = JobPhase::Failed;
                self.status = FAILED_MESSAGE.to_string();
                self.error = Some(failure.message);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn payload() -> ImagePayload {
        ImagePayload {
            mime_type: "image/png".to_string(),
            data: "iVBORw0KGgo=".to_string(),
        }
    }

    fn video() -> GeneratedVideo {
        GeneratedVideo {
            path: PathBuf::from("/tmp/clip.mp4"),
            size_bytes: 42,
        }
    }

    #[test]
    fn request_requires_start_image() {
        let result = GenerationRequest::new(
            "prompt".into(),
            None,
            Some(payload()),
            AspectRatio::Landscape,
            Resolution::Hd720,
        );
        assert_matches!(result, Err(ValidationError::MissingStartImage));

        let request = GenerationRequest::new(
            "prompt".into(),
            Some(payload()),
            None,
            AspectRatio::Portrait,
            Resolution::Hd1080,
        )
        .unwrap();
        assert_eq!(request.aspect_ratio.as_str(), "9:16");
        assert_eq!(request.resolution.as_str(), "1080p");
    }

    #[test]
    fn idle_job_ignores_updates() {
        let mut job = GenerationJob::default();
        assert!(!job.apply(JobUpdate::StillRunning));
        assert!(!job.apply(JobUpdate::Succeeded(video())));
        assert_eq!(job.phase(), JobPhase::Idle);
        assert!(job.can_submit());
    }

    #[test]
    fn happy_path_transitions() {
        let mut job = GenerationJob::submitted();
        assert!(!job.can_submit());

        assert!(job.apply(JobUpdate::Accepted));
        assert_eq!(job.phase(), JobPhase::Polling);
        assert_eq!(job.status(), POLLING_MESSAGES[0]);

        assert!(job.apply(JobUpdate::StillRunning));
        assert_eq!(job.status(), POLLING_MESSAGES[1]);

        assert!(job.apply(JobUpdate::Succeeded(video())));
        assert_eq!(job.phase(), JobPhase::Succeeded);
        assert_eq!(job.progress(), 100);
        assert_eq!(job.video(), Some(&video()));
        assert!(job.can_submit());
    }

    #[test]
    fn polling_progress_is_monotonic_and_capped() {
        let mut job = GenerationJob::submitted();
        job.apply(JobUpdate::Accepted);
        let mut last = job.progress();
        for _ in 0..100 {
            job.apply(JobUpdate::StillRunning);
            assert!(job.progress() >= last);
            assert!(job.progress() < 100);
            last = job.progress();
        }
        assert_eq!(last, 95);
    }

    #[test]
    fn status_messages_cycle() {
        let mut job = GenerationJob::submitted();
        job.apply(JobUpdate::Accepted);
        for _ in 0..POLLING_MESSAGES.len() {
            job.apply(JobUpdate::StillRunning);
        }
        assert_eq!(job.status(), POLLING_MESSAGES[0]);
    }

    #[test]
    fn failure_surfaces_raw_message_once() {
        let mut job = GenerationJob::submitted();
        let failure = JobFailure {
            message: "quota exceeded".to_string(),
            credential_rejected: false,
        };
        assert!(job.apply(JobUpdate::Failed(failure.clone())));
        assert_eq!(job.phase(), JobPhase::Failed);
        assert_eq!(job.error(), Some("quota exceeded"));

        // a second failure report for the same job is ignored
        assert!(!job.apply(JobUpdate::Failed(failure)));
    }

    #[test]
    fn late_accept_after_polling_is_ignored() {
        let mut job = GenerationJob::submitted();
        job.apply(JobUpdate::Accepted);
        job.apply(JobUpdate::StillRunning);
        let progress = job.progress();
        assert!(!job.apply(JobUpdate::Accepted));
        assert_eq!(job.progress(), progress);
    }
}
