//! Recording state machine — the pure core of the voice-answer session.
//!
//! `transition` maps `(state, event)` to `(state, effects)` and never touches
//! a resource itself; the driver executes the returned effects in order.
//! Guards are silent no-ops: an event that is not legal in the current phase
//! returns the state unchanged with no effects. That is what makes a double
//! start, a stray stop, or a premature advance safe to fire from the UI.

use serde::Serialize;

// ────────────────────────────────────────────────────────────────────────────
// State
// ────────────────────────────────────────────────────────────────────────────

/// The session's phase, with the data that only exists in that phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Microphone acquisition starts the moment the user does — the phase is
    /// `Recording` while the permission prompt is still up, which is what
    /// guarantees a second start is a no-op. `stop_pending` is set once the
    /// user has asked to stop and we are waiting for buffered chunks to
    /// flush.
    Recording { stop_pending: bool },
    /// Transcription upload in flight. Cannot be aborted; it settles into
    /// `Stopped` or falls back to `Idle`.
    Uploading,
    /// Transcript available for review before advancing.
    Stopped { transcript: String },
}

/// Flat status view for display and guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Recording,
    Stopped,
    Uploading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderState {
    pub phase: Phase,
    /// Last surfaced error, rendered next to the record control. Cleared on
    /// the next start.
    pub error: Option<String>,
}

impl RecorderState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            error: None,
        }
    }

    pub fn status(&self) -> Status {
        match self.phase {
            Phase::Idle => Status::Idle,
            Phase::Recording { .. } => Status::Recording,
            Phase::Uploading => Status::Uploading,
            Phase::Stopped { .. } => Status::Stopped,
        }
    }

    pub fn transcript(&self) -> Option<&str> {
        match &self.phase {
            Phase::Stopped { transcript } => Some(transcript.as_str()),
            _ => None,
        }
    }

    /// "Next" is enabled only once a non-empty transcript is up for review.
    pub fn can_advance(&self) -> bool {
        matches!(&self.phase, Phase::Stopped { transcript } if !transcript.is_empty())
    }
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::new()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Events and effects
// ────────────────────────────────────────────────────────────────────────────

/// Everything that can happen to a session: user actions, recorder
/// callbacks, and transcription outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    StartRequested,
    /// Microphone acquisition or the recorder itself failed.
    CaptureFailed { message: String },
    StopRequested,
    /// The recorder's stop callback fired and all chunks are assembled.
    CaptureStopped { duration_seconds: u64 },
    TranscriptReady { text: String },
    TranscriptFailed { message: String },
    AdvanceRequested,
    /// The surrounding question changed or the component is going away.
    Teardown,
}

/// Side effects for the driver to execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Stop any in-progress question playback before capture starts.
    StopPlayback,
    AcquireMicrophone,
    StartTimer,
    /// Ask the recorder to stop; the status only changes when the stop
    /// callback fires, to avoid racing in-flight chunks.
    SignalStop,
    /// Stop all microphone tracks. Always ordered before any further
    /// transition work on a stop path.
    ReleaseMicrophone,
    StopTimer,
    SubmitTranscription { duration_seconds: u64 },
    /// Drop the buffered audio. After a successful transcription this is the
    /// privacy guarantee, not an optimization.
    DiscardAudio,
}

// ────────────────────────────────────────────────────────────────────────────
// Transition function
// ────────────────────────────────────────────────────────────────────────────

pub fn transition(state: RecorderState, event: RecorderEvent) -> (RecorderState, Vec<Effect>) {
    use Effect::*;
    use RecorderEvent::*;

    let RecorderState { phase, error } = state;

    match (phase, event) {
        (Phase::Idle, StartRequested) => (
            RecorderState {
                phase: Phase::Recording {
                    stop_pending: false,
                },
                error: None,
            },
            vec![StopPlayback, AcquireMicrophone, StartTimer],
        ),

        (Phase::Recording { .. }, CaptureFailed { message }) => (
            RecorderState {
                phase: Phase::Idle,
                error: Some(message),
            },
            vec![StopTimer, ReleaseMicrophone, DiscardAudio],
        ),

        (
            Phase::Recording {
                stop_pending: false,
            },
            StopRequested,
        ) => (
            RecorderState {
                phase: Phase::Recording { stop_pending: true },
                error,
            },
            vec![SignalStop],
        ),

        (Phase::Recording { .. }, CaptureStopped { duration_seconds }) => (
            RecorderState {
                phase: Phase::Uploading,
                error,
            },
            vec![
                ReleaseMicrophone,
                StopTimer,
                SubmitTranscription { duration_seconds },
            ],
        ),

        (Phase::Uploading, TranscriptReady { text }) => (
            RecorderState {
                phase: Phase::Stopped { transcript: text },
                error,
            },
            vec![DiscardAudio],
        ),

        (Phase::Uploading, TranscriptFailed { message }) => (
            RecorderState {
                phase: Phase::Idle,
                error: Some(message),
            },
            vec![DiscardAudio],
        ),

        (Phase::Stopped { transcript }, AdvanceRequested) if !transcript.is_empty() => {
            (RecorderState::new(), Vec::new())
        }

        (_, Teardown) => (
            RecorderState::new(),
            vec![StopPlayback, ReleaseMicrophone, StopTimer, DiscardAudio],
        ),

        // Guard: anything else is a no-op.
        (phase, _) => (RecorderState { phase, error }, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Effect::*;
    use RecorderEvent::*;

    fn recording() -> RecorderState {
        RecorderState {
            phase: Phase::Recording {
                stop_pending: false,
            },
            error: None,
        }
    }

    fn stopped(transcript: &str) -> RecorderState {
        RecorderState {
            phase: Phase::Stopped {
                transcript: transcript.to_string(),
            },
            error: None,
        }
    }

    #[test]
    fn test_start_from_idle_acquires_microphone() {
        let (state, effects) = transition(RecorderState::new(), StartRequested);
        assert_eq!(state.status(), Status::Recording);
        assert_eq!(effects, vec![StopPlayback, AcquireMicrophone, StartTimer]);
    }

    #[test]
    fn test_start_clears_previous_error() {
        let mut state = RecorderState::new();
        state.error = Some("mic denied".to_string());
        let (state, _) = transition(state, StartRequested);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_second_start_is_a_no_op() {
        let (state, effects) = transition(recording(), StartRequested);
        assert_eq!(state.status(), Status::Recording);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_stop_while_idle_is_a_no_op() {
        let (state, effects) = transition(RecorderState::new(), StopRequested);
        assert_eq!(state.status(), Status::Idle);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_stop_signals_recorder_without_changing_status() {
        let (state, effects) = transition(recording(), StopRequested);
        assert_eq!(state.status(), Status::Recording);
        assert_eq!(effects, vec![SignalStop]);
    }

    #[test]
    fn test_second_stop_request_is_a_no_op() {
        let (state, _) = transition(recording(), StopRequested);
        let (state, effects) = transition(state, StopRequested);
        assert_eq!(state.status(), Status::Recording);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_capture_failure_returns_to_idle_with_message() {
        let (state, effects) = transition(
            recording(),
            CaptureFailed {
                message: "permission denied".to_string(),
            },
        );
        assert_eq!(state.status(), Status::Idle);
        assert_eq!(state.error.as_deref(), Some("permission denied"));
        assert_eq!(effects, vec![StopTimer, ReleaseMicrophone, DiscardAudio]);
    }

    #[test]
    fn test_stop_callback_releases_microphone_before_submitting() {
        let (state, effects) = transition(
            recording(),
            CaptureStopped {
                duration_seconds: 42,
            },
        );
        assert_eq!(state.status(), Status::Uploading);
        assert_eq!(
            effects,
            vec![
                ReleaseMicrophone,
                StopTimer,
                SubmitTranscription {
                    duration_seconds: 42
                },
            ]
        );
    }

    #[test]
    fn test_transcript_ready_settles_in_stopped_and_discards_audio() {
        let uploading = RecorderState {
            phase: Phase::Uploading,
            error: None,
        };
        let (state, effects) = transition(
            uploading,
            TranscriptReady {
                text: "my answer".to_string(),
            },
        );
        assert_eq!(state.status(), Status::Stopped);
        assert_eq!(state.transcript(), Some("my answer"));
        assert_eq!(effects, vec![DiscardAudio]);
    }

    #[test]
    fn test_transcript_failure_returns_to_idle_with_no_partial_transcript() {
        let uploading = RecorderState {
            phase: Phase::Uploading,
            error: None,
        };
        let (state, effects) = transition(
            uploading,
            TranscriptFailed {
                message: "upload failed".to_string(),
            },
        );
        assert_eq!(state.status(), Status::Idle);
        assert_eq!(state.transcript(), None);
        assert_eq!(state.error.as_deref(), Some("upload failed"));
        assert_eq!(effects, vec![DiscardAudio]);
    }

    #[test]
    fn test_advance_requires_non_empty_transcript() {
        let (state, effects) = transition(stopped(""), AdvanceRequested);
        assert_eq!(state.status(), Status::Stopped);
        assert!(effects.is_empty());
        assert!(!stopped("").can_advance());

        let (state, _) = transition(stopped("done"), AdvanceRequested);
        assert_eq!(state.status(), Status::Idle);
        assert!(stopped("done").can_advance());
    }

    #[test]
    fn test_teardown_releases_everything_from_any_phase() {
        for state in [
            RecorderState::new(),
            recording(),
            RecorderState {
                phase: Phase::Uploading,
                error: None,
            },
            stopped("answer"),
        ] {
            let (next, effects) = transition(state, Teardown);
            assert_eq!(next, RecorderState::new());
            assert_eq!(
                effects,
                vec![StopPlayback, ReleaseMicrophone, StopTimer, DiscardAudio]
            );
        }
    }
}
