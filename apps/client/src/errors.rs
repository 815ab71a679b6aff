use thiserror::Error;

/// Client-level error type.
/// Every async step that can fail funnels into one of these variants; the
/// page renders `user_message()` next to the control that triggered the call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Microphone error: {0}")]
    Microphone(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// The message shown to the user. Detail goes to the log; the user gets
    /// a calm sentence and a way to retry.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http(e) => {
                tracing::error!("HTTP error: {e}");
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::Api { status, message } => {
                tracing::error!("API error (status {status}): {message}");
                if message.is_empty() {
                    "The server rejected the request. Please try again.".to_string()
                } else {
                    message.clone()
                }
            }
            ClientError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            ClientError::Microphone(msg) => {
                tracing::warn!("Microphone error: {msg}");
                "Microphone access failed. Check your browser permissions and try again.".to_string()
            }
            ClientError::Playback(msg) => {
                tracing::warn!("Playback error: {msg}");
                "Audio playback failed.".to_string()
            }
            ClientError::Transcription(msg) => {
                tracing::error!("Transcription error: {msg}");
                "Could not transcribe your answer. Please record it again.".to_string()
            }
            ClientError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
