//! Effect executor for the voice-answer session.
//!
//! `VoiceRecorder` owns every resource the pure machine only names:
//! the capture handle, the elapsed-seconds ticker, the buffered audio, and
//! the playback handle for synthesized question audio. Events funnel
//! through `machine::transition`; the effects come back out and are
//! executed here, in order. Any effect that fails feeds a failure event
//! straight back into the machine, so every path lands in a well-defined
//! status with the resources released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::interview::audio::{
    negotiate_mime_type, AudioCapture, CaptureHandle, PlaybackHandle, RecordedAudio, SpeechPlayer,
};
use crate::interview::machine::{self, Effect, RecorderEvent, RecorderState, Status};

/// How often the elapsed-seconds display updates while recording.
const TICK_INTERVAL: Duration = Duration::from_millis(500);

// ────────────────────────────────────────────────────────────────────────────
// Transcription seam
// ────────────────────────────────────────────────────────────────────────────

/// The one network call the session makes. `ApiClient` is the production
/// implementation; tests swap in a fake.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: Bytes,
        mime_type: &str,
        question_id: &str,
        duration_seconds: u64,
    ) -> Result<String, ClientError>;
}

#[async_trait]
impl Transcriber for ApiClient {
    async fn transcribe(
        &self,
        audio: Bytes,
        mime_type: &str,
        question_id: &str,
        duration_seconds: u64,
    ) -> Result<String, ClientError> {
        self.submit_voice_answer(audio, mime_type, question_id, duration_seconds)
            .await
            .map(|answer| answer.transcription)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Driver
// ────────────────────────────────────────────────────────────────────────────

/// One voice-answer session. Created when the voice tab opens for a
/// question; reset whenever the active question changes.
pub struct VoiceRecorder {
    state: RecorderState,
    capture: Arc<dyn AudioCapture>,
    player: Arc<dyn SpeechPlayer>,
    transcriber: Arc<dyn Transcriber>,
    /// Negotiated once at construction; empty string means platform default.
    mime_type: String,
    question_id: Option<String>,
    handle: Option<Box<dyn CaptureHandle>>,
    playback: Option<Box<dyn PlaybackHandle>>,
    audio: Option<RecordedAudio>,
    elapsed: Arc<AtomicU64>,
    ticker: Option<JoinHandle<()>>,
    started_at: Option<Instant>,
    /// Correlation id for one recording attempt, regenerated per start.
    attempt: Uuid,
}

impl VoiceRecorder {
    pub fn new(
        capture: Arc<dyn AudioCapture>,
        player: Arc<dyn SpeechPlayer>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        let mime_type = negotiate_mime_type(capture.as_ref());
        info!(%mime_type, "voice recorder ready");
        Self {
            state: RecorderState::new(),
            capture,
            player,
            transcriber,
            mime_type,
            question_id: None,
            handle: None,
            playback: None,
            audio: None,
            elapsed: Arc::new(AtomicU64::new(0)),
            ticker: None,
            started_at: None,
            attempt: Uuid::new_v4(),
        }
    }

    /// Switches to a new active question, tearing down whatever the previous
    /// one left behind.
    pub async fn set_question(&mut self, question_id: impl Into<String>) {
        self.dispatch(RecorderEvent::Teardown).await;
        self.question_id = Some(question_id.into());
        self.elapsed.store(0, Ordering::Relaxed);
    }

    /// Starts recording. No-op unless an active question exists and the
    /// status is exactly idle.
    pub async fn start(&mut self) {
        if self.question_id.is_none() {
            debug!("start ignored: no active question");
            return;
        }
        if self.state.status() != Status::Idle {
            debug!(status = ?self.state.status(), "start ignored: session busy");
            return;
        }
        self.attempt = Uuid::new_v4();
        info!(attempt = %self.attempt, "recording requested");
        self.dispatch(RecorderEvent::StartRequested).await;
    }

    /// Asks the recorder to stop. The status changes only once the stop
    /// callback fires and the transcription settles; a second request while
    /// chunks flush is a no-op.
    pub async fn request_stop(&mut self) {
        self.dispatch(RecorderEvent::StopRequested).await;
    }

    /// Advances past a reviewed answer. Returns false (and does nothing)
    /// until a non-empty transcript is present; the caller fetches the next
    /// question and calls `set_question`.
    pub async fn advance(&mut self) -> bool {
        if !self.state.can_advance() {
            return false;
        }
        self.dispatch(RecorderEvent::AdvanceRequested).await;
        self.elapsed.store(0, Ordering::Relaxed);
        true
    }

    /// Forcibly releases every resource. Used when the surrounding page
    /// navigates away.
    pub async fn teardown(&mut self) {
        self.dispatch(RecorderEvent::Teardown).await;
        self.elapsed.store(0, Ordering::Relaxed);
    }

    /// Plays synthesized question audio, replacing any playback already in
    /// progress. Recording always stops playback first, so a prompt can
    /// never talk over the user's answer.
    pub fn play_prompt(&mut self, audio: Bytes) {
        if let Some(mut playback) = self.playback.take() {
            playback.stop();
        }
        match self.player.play(audio) {
            Ok(handle) => self.playback = Some(handle),
            Err(e) => self.state.error = Some(e.user_message()),
        }
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn transcript(&self) -> Option<&str> {
        self.state.transcript()
    }

    pub fn can_advance(&self) -> bool {
        self.state.can_advance()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// True only between the stop callback and the transcription result;
    /// audio is never retained once a transcript exists.
    pub fn has_buffered_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn question_id(&self) -> Option<&str> {
        self.question_id.as_deref()
    }

    /// Runs an event through the pure machine, then executes the effects.
    /// Effects that resolve asynchronously (acquisition, stop, upload) feed
    /// their outcome back in as the next event.
    async fn dispatch(&mut self, event: RecorderEvent) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let (state, effects) = machine::transition(self.state.clone(), event);
            self.state = state;
            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect).await {
                    next = Some(follow_up);
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<RecorderEvent> {
        match effect {
            Effect::StopPlayback => {
                if let Some(mut playback) = self.playback.take() {
                    playback.stop();
                }
                None
            }

            Effect::AcquireMicrophone => match self.capture.start(&self.mime_type).await {
                Ok(handle) => {
                    self.handle = Some(handle);
                    self.started_at = Some(Instant::now());
                    debug!(attempt = %self.attempt, "microphone acquired");
                    None
                }
                Err(e) => {
                    warn!(attempt = %self.attempt, "microphone acquisition failed: {e}");
                    Some(RecorderEvent::CaptureFailed {
                        message: e.user_message(),
                    })
                }
            },

            // Only tick while a live capture exists; an acquisition failure
            // in the same batch leaves nothing to time.
            Effect::StartTimer => {
                if self.handle.is_some() {
                    self.spawn_ticker();
                }
                None
            }

            Effect::SignalStop => {
                let Some(handle) = self.handle.as_mut() else {
                    return None;
                };
                match handle.stop().await {
                    Ok(audio) => {
                        self.audio = Some(audio);
                        Some(RecorderEvent::CaptureStopped {
                            duration_seconds: self.measured_duration(),
                        })
                    }
                    Err(e) => Some(RecorderEvent::CaptureFailed {
                        message: e.user_message(),
                    }),
                }
            }

            Effect::ReleaseMicrophone => {
                if let Some(mut handle) = self.handle.take() {
                    handle.release();
                }
                None
            }

            Effect::StopTimer => {
                if let Some(ticker) = self.ticker.take() {
                    ticker.abort();
                }
                None
            }

            Effect::SubmitTranscription { duration_seconds } => {
                let (Some(audio), Some(question_id)) =
                    (self.audio.as_ref(), self.question_id.as_deref())
                else {
                    return Some(RecorderEvent::TranscriptFailed {
                        message: "No recorded audio to submit.".to_string(),
                    });
                };
                debug!(
                    attempt = %self.attempt,
                    question_id,
                    duration_seconds,
                    bytes = audio.bytes.len(),
                    "submitting for transcription"
                );
                match self
                    .transcriber
                    .transcribe(
                        audio.bytes.clone(),
                        &audio.mime_type,
                        question_id,
                        duration_seconds,
                    )
                    .await
                {
                    Ok(text) => Some(RecorderEvent::TranscriptReady { text }),
                    Err(e) => Some(RecorderEvent::TranscriptFailed {
                        message: e.user_message(),
                    }),
                }
            }

            Effect::DiscardAudio => {
                self.audio = None;
                None
            }
        }
    }

    fn spawn_ticker(&mut self) {
        if let Some(old) = self.ticker.take() {
            old.abort();
        }
        self.elapsed.store(0, Ordering::Relaxed);
        let elapsed = self.elapsed.clone();
        let started = Instant::now();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                elapsed.store(started.elapsed().as_secs(), Ordering::Relaxed);
            }
        }));
    }

    /// Elapsed duration for the submitted answer: the displayed ticker value
    /// when it has ticked, wall-clock since recording start otherwise.
    fn measured_duration(&self) -> u64 {
        let ticked = self.elapsed.load(Ordering::Relaxed);
        if ticked > 0 {
            return ticked;
        }
        self.started_at
            .map(|started| started.elapsed().as_secs())
            .unwrap_or(0)
    }
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(mut handle) = self.handle.take() {
            handle.release();
        }
        if let Some(mut playback) = self.playback.take() {
            playback.stop();
        }
        self.audio = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    #[derive(Default)]
    struct MicState {
        acquires: AtomicUsize,
        live_tracks: AtomicUsize,
        deny: AtomicBool,
    }

    struct MockCapture {
        mic: Arc<MicState>,
    }

    #[async_trait]
    impl AudioCapture for MockCapture {
        fn supports_mime_type(&self, mime_type: &str) -> bool {
            mime_type == "audio/webm;codecs=opus"
        }

        async fn start(&self, mime_type: &str) -> Result<Box<dyn CaptureHandle>, ClientError> {
            if self.mic.deny.load(Ordering::Relaxed) {
                return Err(ClientError::Microphone("permission denied".to_string()));
            }
            self.mic.acquires.fetch_add(1, Ordering::Relaxed);
            self.mic.live_tracks.store(1, Ordering::Relaxed);
            Ok(Box::new(MockHandle {
                mic: self.mic.clone(),
                mime_type: mime_type.to_string(),
            }))
        }
    }

    struct MockHandle {
        mic: Arc<MicState>,
        mime_type: String,
    }

    #[async_trait]
    impl CaptureHandle for MockHandle {
        async fn stop(&mut self) -> Result<RecordedAudio, ClientError> {
            Ok(RecordedAudio {
                bytes: Bytes::from_static(b"assembled-chunks"),
                mime_type: self.mime_type.clone(),
            })
        }

        fn release(&mut self) {
            self.mic.live_tracks.store(0, Ordering::Relaxed);
        }
    }

    struct MockPlayer;

    impl SpeechPlayer for MockPlayer {
        fn play(&self, _audio: Bytes) -> Result<Box<dyn PlaybackHandle>, ClientError> {
            Ok(Box::new(MockPlayback))
        }
    }

    struct MockPlayback;

    impl PlaybackHandle for MockPlayback {
        fn stop(&mut self) {}
    }

    /// `reply: None` fails the upload.
    struct MockTranscriber {
        reply: Option<String>,
    }

    #[async_trait]
    impl Transcriber for MockTranscriber {
        async fn transcribe(
            &self,
            _audio: Bytes,
            _mime_type: &str,
            _question_id: &str,
            _duration_seconds: u64,
        ) -> Result<String, ClientError> {
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(ClientError::Transcription("upload failed".to_string())),
            }
        }
    }

    fn recorder(mic: Arc<MicState>, reply: Option<&str>) -> VoiceRecorder {
        VoiceRecorder::new(
            Arc::new(MockCapture { mic }),
            Arc::new(MockPlayer),
            Arc::new(MockTranscriber {
                reply: reply.map(String::from),
            }),
        )
    }

    #[tokio::test]
    async fn test_happy_path_records_transcribes_and_drops_audio() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), Some("my answer"));
        session.set_question("q1").await;

        session.start().await;
        assert_eq!(session.status(), Status::Recording);
        assert_eq!(mic.live_tracks.load(Ordering::Relaxed), 1);

        session.request_stop().await;
        assert_eq!(session.status(), Status::Stopped);
        assert_eq!(session.transcript(), Some("my answer"));
        assert!(!session.has_buffered_audio());
        assert_eq!(mic.live_tracks.load(Ordering::Relaxed), 0);
        assert!(session.ticker.is_none());
        assert!(session.can_advance());
    }

    #[tokio::test]
    async fn test_double_start_acquires_microphone_once() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), Some("x"));
        session.set_question("q1").await;

        session.start().await;
        session.start().await;
        assert_eq!(mic.acquires.load(Ordering::Relaxed), 1);
        assert_eq!(session.status(), Status::Recording);
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_a_no_op() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), Some("x"));
        session.set_question("q1").await;

        session.request_stop().await;
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(mic.acquires.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_start_without_active_question_is_a_no_op() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), Some("x"));

        session.start().await;
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(mic.acquires.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_permission_denial_returns_to_idle_with_error() {
        let mic = Arc::new(MicState::default());
        mic.deny.store(true, Ordering::Relaxed);
        let mut session = recorder(mic.clone(), Some("x"));
        session.set_question("q1").await;

        session.start().await;
        assert_eq!(session.status(), Status::Idle);
        assert!(session.error().is_some());
        assert_eq!(mic.live_tracks.load(Ordering::Relaxed), 0);
        assert!(session.ticker.is_none());
    }

    #[tokio::test]
    async fn test_failed_upload_returns_to_idle_and_discards_audio() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), None);
        session.set_question("q1").await;

        session.start().await;
        session.request_stop().await;
        assert_eq!(session.status(), Status::Idle);
        assert!(session.error().is_some());
        assert_eq!(session.transcript(), None);
        assert!(!session.has_buffered_audio());
        assert_eq!(mic.live_tracks.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_retry_after_failure_starts_fresh() {
        let mic = Arc::new(MicState::default());
        mic.deny.store(true, Ordering::Relaxed);
        let mut session = recorder(mic.clone(), Some("second try"));
        session.set_question("q1").await;

        session.start().await;
        assert_eq!(session.status(), Status::Idle);

        mic.deny.store(false, Ordering::Relaxed);
        session.start().await;
        assert_eq!(session.status(), Status::Recording);
        assert_eq!(session.error(), None);
    }

    #[tokio::test]
    async fn test_teardown_while_recording_releases_everything() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), Some("x"));
        session.set_question("q1").await;

        session.start().await;
        assert_eq!(mic.live_tracks.load(Ordering::Relaxed), 1);

        session.teardown().await;
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(mic.live_tracks.load(Ordering::Relaxed), 0);
        assert!(session.ticker.is_none());
        assert!(!session.has_buffered_audio());
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[tokio::test]
    async fn test_question_change_resets_the_session() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), Some("answer one"));
        session.set_question("q1").await;

        session.start().await;
        session.request_stop().await;
        assert_eq!(session.transcript(), Some("answer one"));

        session.set_question("q2").await;
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.transcript(), None);
        assert_eq!(session.question_id(), Some("q2"));
    }

    #[tokio::test]
    async fn test_advance_requires_non_empty_transcript() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), Some(""));
        session.set_question("q1").await;

        session.start().await;
        session.request_stop().await;
        assert_eq!(session.status(), Status::Stopped);
        assert!(!session.advance().await);
        assert_eq!(session.status(), Status::Stopped);
    }

    #[tokio::test]
    async fn test_advance_after_review_returns_to_idle() {
        let mic = Arc::new(MicState::default());
        let mut session = recorder(mic.clone(), Some("done"));
        session.set_question("q1").await;

        session.start().await;
        session.request_stop().await;
        assert!(session.advance().await);
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.transcript(), None);
    }

    #[tokio::test]
    async fn test_negotiates_preferred_mime_type() {
        let mic = Arc::new(MicState::default());
        let session = recorder(mic, Some("x"));
        assert_eq!(session.mime_type, "audio/webm;codecs=opus");
    }
}
