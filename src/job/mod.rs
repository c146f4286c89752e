// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Generation job controller.
//!
//! [`JobController`] lives on the UI thread and owns the current
//! [`GenerationJob`]. Submitting spawns [`run_generation`] on the tokio
//! runtime; the driver reports [`JobUpdate`]s over a channel that the UI
//! drains once per frame with [`JobController::pump`]. Polls are strictly
//! sequential: the next wait starts only after the previous check returns.

pub mod backend;
pub mod credentials;
pub mod veo;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use backend::{BackendError, VideoBackend};
use credentials::CredentialProvider;

use crate::models::generation::{
    AspectRatio, GeneratedVideo, GenerationJob, GenerationRequest, ImagePayload, JobFailure,
    JobUpdate, Resolution, ValidationError,
};

/// Owns the job lifecycle on the UI side.
pub struct JobController {
    backend: Arc<dyn VideoBackend>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    runtime: tokio::runtime::Handle,
    poll_interval: Duration,
    output_dir: PathBuf,
    job: GenerationJob,
    submissions: u64,
    /// Receiver for the in-flight job's updates
    updates: Option<Receiver<JobUpdate>>,
}

impl JobController {
    pub fn new(
        backend: Arc<dyn VideoBackend>,
        credentials: Option<Arc<dyn CredentialProvider>>,
        runtime: tokio::runtime::Handle,
        poll_interval: Duration,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            backend,
            credentials,
            runtime,
            poll_interval,
            output_dir,
            job: GenerationJob::default(),
            submissions: 0,
            updates: None,
        }
    }

    pub fn job(&self) -> &GenerationJob {
        &self.job
    }

    /// Start a brand-new job, discarding whatever the previous one left behind.
    ///
    /// Rejected without any state change when no starting image is present
    /// or a job is already in flight.
    pub fn submit(
        &mut self,
        prompt: String,
        start_image: Option<ImagePayload>,
        end_image: Option<ImagePayload>,
        aspect_ratio: AspectRatio,
        resolution: Resolution,
    ) -> Result<(), ValidationError> {
        if !self.job.can_submit() {
            return Err(ValidationError::JobInFlight);
        }
        let request =
            GenerationRequest::new(prompt, start_image, end_image, aspect_ratio, resolution)?;

        if let Some(previous) = self.job.video() {
            discard_video(&previous.path);
        }

        self.submissions += 1;
        let output_path = self
            .output_dir
            .join(format!("keyframe-studio-{}.mp4", self.submissions));

        let (sender, receiver) = channel();
        self.updates = Some(receiver);
        self.job = GenerationJob::submitted();

        log::info!(
            "Submitting generation job #{} ({}, {}, end frame: {})",
            self.submissions,
            request.aspect_ratio.as_str(),
            request.resolution.as_str(),
            request.end_image.is_some()
        );

        let backend = self.backend.clone();
        let credentials = self.credentials.clone();
        let poll_interval = self.poll_interval;
        self.runtime.spawn(async move {
            if let Some(credentials) = credentials {
                if !credentials.has_selected_key().await {
                    credentials.open_select_key().await;
                }
            }
            run_generation(backend.as_ref(), &request, poll_interval, &output_path, sender).await;
        });

        Ok(())
    }

    /// Apply every update that has arrived since the last frame.
    ///
    /// Returns true when the job state changed.
    pub fn pump(&mut self) -> bool {
        let Some(receiver) = self.updates.as_ref() else {
            return false;
        };

        let mut changed = false;
        let mut finished = false;
        loop {
            match receiver.try_recv() {
                Ok(update) => {
                    let credential_rejected =
                        matches!(&update, JobUpdate::Failed(f) if f.credential_rejected);
                    if self.job.apply(update) {
                        changed = true;
                        if credential_rejected {
                            if let Some(credentials) = &self.credentials {
                                credentials.reset_selection();
                            }
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.updates = None;
            // the driver always reports a terminal update; getting here while
            // active means the task died underneath us
            if self.job.is_active() {
                changed |= self.job.apply(JobUpdate::Failed(JobFailure {
                    message: "The generation task stopped unexpectedly.".to_string(),
                    credential_rejected: false,
                }));
            }
        }

        changed
    }
}

fn discard_video(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Removed previous video {}", path.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("Could not remove previous video {}: {}", path.display(), err),
    }
}

/// Drive one request to completion, reporting progress on `updates`.
///
/// Send failures are ignored: a dropped receiver means nobody is watching
/// this job any more.
pub async fn run_generation(
    backend: &dyn VideoBackend,
    request: &GenerationRequest,
    poll_interval: Duration,
    output_path: &Path,
    updates: Sender<JobUpdate>,
) {
    let outcome = drive(backend, request, poll_interval, output_path, &updates).await;
    let update = match outcome {
        Ok(video) => {
            log::info!(
                "Generation finished: {} ({} bytes)",
                video.path.display(),
                video.size_bytes
            );
            JobUpdate::Succeeded(video)
        }
        Err(err) => {
            log::error!("Generation failed: {}", err);
            JobUpdate::Failed(JobFailure {
                credential_rejected: err.is_credential_error(),
                message: err.to_string(),
            })
        }
    };
    let _ = updates.send(update);
}

async fn drive(
    backend: &dyn VideoBackend,
    request: &GenerationRequest,
    poll_interval: Duration,
    output_path: &Path,
    updates: &Sender<JobUpdate>,
) -> Result<GeneratedVideo, BackendError> {
    let mut operation = backend.submit(request).await?;
    log::info!("Operation started: {}", operation.name);

    if !operation.done {
        let _ = updates.send(JobUpdate::Accepted);
    }

    while !operation.done {
        tokio::time::sleep(poll_interval).await;
        operation = backend.poll(&operation).await?;
        if !operation.done {
            log::debug!("Operation {} still running", operation.name);
            let _ = updates.send(JobUpdate::StillRunning);
        }
    }

    let video_uri = operation.video_uri.ok_or(BackendError::MissingVideo)?;
    let bytes = backend.fetch(&video_uri).await?;

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output_path, &bytes).await?;

    Ok(GeneratedVideo {
        path: output_path.to_path_buf(),
        size_bytes: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::generation::JobPhase;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use backend::Operation;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend that replays a fixed script of poll results.
    #[derive(Default)]
    struct ScriptedBackend {
        submit_error: Option<String>,
        polls: Mutex<VecDeque<Result<Operation, String>>>,
        submits: AtomicUsize,
        poll_calls: AtomicUsize,
        fetches: AtomicUsize,
    }

    impl ScriptedBackend {
        fn finishing_after(pending_polls: usize) -> Self {
            let mut polls: VecDeque<Result<Operation, String>> =
                (0..pending_polls).map(|_| Ok(pending())).collect();
            polls.push_back(Ok(Operation {
                name: "operations/test".to_string(),
                done: true,
                video_uri: Some("https://files/test".to_string()),
            }));
            Self {
                polls: Mutex::new(polls),
                ..Default::default()
            }
        }

        fn failing_poll(message: &str) -> Self {
            Self {
                polls: Mutex::new(VecDeque::from([Err(message.to_string())])),
                ..Default::default()
            }
        }
    }

    fn pending() -> Operation {
        Operation {
            name: "operations/test".to_string(),
            done: false,
            video_uri: None,
        }
    }

    #[async_trait]
    impl VideoBackend for ScriptedBackend {
        async fn submit(&self, _request: &GenerationRequest) -> Result<Operation, BackendError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            match &self.submit_error {
                Some(message) => Err(BackendError::Api {
                    status: 400,
                    message: message.clone(),
                }),
                None => Ok(pending()),
            }
        }

        async fn poll(&self, _operation: &Operation) -> Result<Operation, BackendError> {
            self.poll_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.polls.lock().unwrap().pop_front();
            match next {
                Some(Ok(op)) => Ok(op),
                Some(Err(message)) => Err(BackendError::Operation(message)),
                None => Ok(pending()),
            }
        }

        async fn fetch(&self, _video_uri: &str) -> Result<Vec<u8>, BackendError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(b"fake mp4 bytes".to_vec())
        }
    }

    #[derive(Default)]
    struct CountingCredentials {
        has_key: AtomicBool,
        opened: AtomicUsize,
        resets: AtomicUsize,
    }

    #[async_trait]
    impl CredentialProvider for CountingCredentials {
        async fn has_selected_key(&self) -> bool {
            self.has_key.load(Ordering::SeqCst)
        }

        async fn open_select_key(&self) {
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.has_key.store(true, Ordering::SeqCst);
        }

        fn reset_selection(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
            self.has_key.store(false, Ordering::SeqCst);
        }
    }

    fn image() -> Option<ImagePayload> {
        Some(ImagePayload {
            mime_type: "image/png".to_string(),
            data: "AAAA".to_string(),
        })
    }

    fn controller(
        backend: Arc<ScriptedBackend>,
        credentials: Option<Arc<CountingCredentials>>,
        dir: &Path,
    ) -> JobController {
        JobController::new(
            backend,
            credentials.map(|c| c as Arc<dyn CredentialProvider>),
            tokio::runtime::Handle::current(),
            Duration::from_millis(1),
            dir.to_path_buf(),
        )
    }

    /// Pump until the job settles, checking progress never goes backwards.
    async fn settle(controller: &mut JobController) -> Vec<u8> {
        let mut seen = vec![controller.job().progress()];
        for _ in 0..1000 {
            if controller.pump() {
                let progress = controller.job().progress();
                assert!(progress >= *seen.last().unwrap());
                if controller.job().phase() != JobPhase::Succeeded {
                    assert!(progress < 100);
                }
                seen.push(progress);
            }
            if !controller.job().is_active() {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("job never settled: {:?}", controller.job());
    }

    #[tokio::test]
    async fn missing_start_image_is_rejected_without_backend_call() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend::finishing_after(0));
        let mut controller = controller(backend.clone(), None, dir.path());

        let result = controller.submit(
            "prompt".into(),
            None,
            image(),
            AspectRatio::Landscape,
            Resolution::Hd720,
        );
        assert_matches!(result, Err(ValidationError::MissingStartImage));
        assert_eq!(controller.job().phase(), JobPhase::Idle);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!controller.pump());
        assert_eq!(backend.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_job_polls_then_fetches() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend::finishing_after(3));
        let mut controller = controller(backend.clone(), None, dir.path());

        controller
            .submit("prompt".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720)
            .unwrap();
        assert_eq!(controller.job().phase(), JobPhase::Submitted);
        assert_matches!(
            controller.submit("again".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720),
            Err(ValidationError::JobInFlight)
        );

        let progress = settle(&mut controller).await;
        assert_eq!(controller.job().phase(), JobPhase::Succeeded);
        assert_eq!(*progress.last().unwrap(), 100);
        assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
        assert_eq!(backend.poll_calls.load(Ordering::SeqCst), 4);
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 1);

        let video = controller.job().video().unwrap();
        assert_eq!(std::fs::read(&video.path).unwrap(), b"fake mp4 bytes");
    }

    #[tokio::test]
    async fn submit_error_fails_job_with_raw_message() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend {
            submit_error: Some("Resource has been exhausted".to_string()),
            ..Default::default()
        });
        let mut controller = controller(backend.clone(), None, dir.path());

        controller
            .submit("prompt".into(), image(), None, AspectRatio::Portrait, Resolution::Hd1080)
            .unwrap();
        settle(&mut controller).await;

        assert_eq!(controller.job().phase(), JobPhase::Failed);
        assert_eq!(controller.job().error(), Some("Resource has been exhausted"));
        assert_eq!(backend.poll_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn credential_error_resets_key_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend::failing_poll("Requested entity was not found."));
        let credentials = Arc::new(CountingCredentials::default());
        credentials.has_key.store(true, Ordering::SeqCst);
        let mut controller = controller(backend, Some(credentials.clone()), dir.path());

        controller
            .submit("prompt".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720)
            .unwrap();
        settle(&mut controller).await;
        // extra pumps after settling must not repeat the side effect
        controller.pump();
        controller.pump();

        assert_eq!(controller.job().phase(), JobPhase::Failed);
        assert_eq!(controller.job().error(), Some("Requested entity was not found."));
        assert_eq!(credentials.resets.load(Ordering::SeqCst), 1);
        assert_eq!(credentials.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ordinary_failure_leaves_credentials_alone() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend::failing_poll("Video generation failed"));
        let credentials = Arc::new(CountingCredentials::default());
        credentials.has_key.store(true, Ordering::SeqCst);
        let mut controller = controller(backend, Some(credentials.clone()), dir.path());

        controller
            .submit("prompt".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720)
            .unwrap();
        settle(&mut controller).await;

        assert_eq!(controller.job().phase(), JobPhase::Failed);
        assert_eq!(credentials.resets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_key_opens_selection_before_submitting() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend::finishing_after(0));
        let credentials = Arc::new(CountingCredentials::default());
        let mut controller = controller(backend.clone(), Some(credentials.clone()), dir.path());

        controller
            .submit("prompt".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720)
            .unwrap();
        settle(&mut controller).await;

        assert_eq!(credentials.opened.load(Ordering::SeqCst), 1);
        assert_eq!(controller.job().phase(), JobPhase::Succeeded);
    }

    #[tokio::test]
    async fn resubmission_starts_fresh_job() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend::failing_poll("boom"));
        let mut controller = controller(backend.clone(), None, dir.path());

        controller
            .submit("first".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720)
            .unwrap();
        settle(&mut controller).await;
        assert_eq!(controller.job().phase(), JobPhase::Failed);

        // the script is exhausted, so the fake now reports pending forever;
        // the new job must start clean rather than inherit the old error
        controller
            .submit("second".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720)
            .unwrap();
        assert_eq!(controller.job().phase(), JobPhase::Submitted);
        assert_eq!(controller.job().error(), None);
        assert_eq!(controller.job().progress(), 0);
        assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn new_job_removes_previous_video() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedBackend::finishing_after(0));
        let mut controller = controller(backend, None, dir.path());

        controller
            .submit("first".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720)
            .unwrap();
        settle(&mut controller).await;
        let first = controller.job().video().unwrap().path.clone();
        assert!(first.exists());

        controller
            .submit("second".into(), image(), None, AspectRatio::Landscape, Resolution::Hd720)
            .unwrap();
        assert!(!first.exists());
        assert_eq!(controller.job().video(), None);
    }

    #[tokio::test]
    async fn updates_after_receiver_dropped_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::finishing_after(1);
        let request = GenerationRequest::new(
            "prompt".into(),
            image(),
            None,
            AspectRatio::Landscape,
            Resolution::Hd720,
        )
        .unwrap();
        let (sender, receiver) = channel();
        drop(receiver);

        // must complete without panicking even though nobody listens
        run_generation(
            &backend,
            &request,
            Duration::from_millis(1),
            &dir.path().join("clip.mp4"),
            sender,
        )
        .await;
        assert!(dir.path().join("clip.mp4").exists());
    }
}
