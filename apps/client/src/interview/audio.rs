//! Capability traits for the platform media stack.
//!
//! The recording state machine is written against these seams so it can be
//! exercised with in-memory fakes; the embedding shell supplies the real
//! microphone and audio-output implementations.

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::ClientError;

/// Codec preference for the recorder, best first. The first MIME type the
/// platform advertises support for wins; if it advertises none, the empty
/// string lets the recorder fall back to its own default.
pub const PREFERRED_MIME_TYPES: [&str; 3] = ["audio/webm;codecs=opus", "audio/webm", "audio/mp4"];

/// A finished recording: the assembled chunks tagged with the MIME type the
/// recorder actually used.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    pub bytes: Bytes,
    pub mime_type: String,
}

/// Microphone capture. `start` may suspend for as long as the user takes to
/// answer the permission prompt.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    fn supports_mime_type(&self, mime_type: &str) -> bool;

    /// Requests microphone access and begins recording. Errors on permission
    /// denial or device failure.
    async fn start(&self, mime_type: &str) -> Result<Box<dyn CaptureHandle>, ClientError>;
}

/// An in-progress capture. Exclusively owned by one recording session.
#[async_trait]
pub trait CaptureHandle: Send + Sync {
    /// Signals the recorder to stop and resolves once buffered chunks have
    /// flushed into the assembled audio.
    async fn stop(&mut self) -> Result<RecordedAudio, ClientError>;

    /// Stops the recorder if it is still running and ends every microphone
    /// track. Best-effort and infallible; safe to call more than once.
    fn release(&mut self);
}

/// Local playback for synthesized question audio.
pub trait SpeechPlayer: Send + Sync {
    fn play(&self, audio: Bytes) -> Result<Box<dyn PlaybackHandle>, ClientError>;
}

/// An in-progress playback. Stopping releases the underlying buffer.
pub trait PlaybackHandle: Send + Sync {
    fn stop(&mut self);
}

/// Picks the recorder MIME type: first preferred type the platform
/// supports, or the empty string for the platform default.
pub fn negotiate_mime_type(capture: &dyn AudioCapture) -> String {
    PREFERRED_MIME_TYPES
        .iter()
        .find(|mime| capture.supports_mime_type(mime))
        .map(|mime| mime.to_string())
        .unwrap_or_default()
}
