//! Remote Service Client — the single point of entry for all backend calls.
//!
//! ARCHITECTURAL RULE: no other module may issue HTTP to the platform
//! backend directly. All remote reads and writes go through `ApiClient`.
//!
//! Calls are single-shot on purpose: every operation here sits directly
//! behind a user action, and the error policy is "surface the message, let
//! the user re-invoke" — never an automatic retry.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::ClientError;
use crate::session::SessionStore;

pub mod types;

use self::types::{InterviewSession, JobMatches, SpeechRequest, StudentProfile, VoiceAnswer};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend error envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The typed backend client shared by every page of the app.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Config,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: Config, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            config,
            session,
        }
    }

    /// Fetches an interview session with its ordered question list.
    pub async fn get_session(&self, session_id: &str) -> Result<InterviewSession, ClientError> {
        let request = self
            .http
            .get(self.url(&format!("/api/v1/interviews/{session_id}")));
        let response = self.check(self.authorize(request).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Uploads a recorded voice answer for transcription. Multipart fields
    /// match the backend contract: `audio`, `questionId`, `answerMethod`,
    /// `language`, `durationSeconds`.
    pub async fn submit_voice_answer(
        &self,
        audio: Bytes,
        mime_type: &str,
        question_id: &str,
        duration_seconds: u64,
    ) -> Result<VoiceAnswer, ClientError> {
        let file_name = format!("answer.{}", extension_for(mime_type));
        let mut part = Part::bytes(audio.to_vec()).file_name(file_name);
        if !mime_type.is_empty() {
            part = part.mime_str(mime_type)?;
        }
        let form = Form::new()
            .part("audio", part)
            .text("questionId", question_id.to_string())
            .text("answerMethod", "voice")
            .text("language", self.config.language.clone())
            .text("durationSeconds", duration_seconds.to_string());

        let request = self
            .http
            .post(self.url("/api/v1/interviews/answers/voice"))
            .multipart(form);
        let response = self.check(self.authorize(request).send().await?).await?;
        let answer: VoiceAnswer = response.json().await?;
        debug!(
            question_id,
            duration_seconds,
            transcript_chars = answer.transcription.len(),
            "voice answer transcribed"
        );
        Ok(answer)
    }

    /// Synthesizes speech for a question prompt. Raw audio bytes come back
    /// and are played locally, never persisted.
    pub async fn synthesize_speech(&self, text: &str) -> Result<Bytes, ClientError> {
        let body = SpeechRequest {
            text: text.to_string(),
            model: self.config.speech_model.clone(),
            voice: self.config.speech_voice.clone(),
            response_format: self.config.speech_format.clone(),
        };
        let request = self.http.post(self.url("/api/v1/speech/synthesize")).json(&body);
        let response = self.check(self.authorize(request).send().await?).await?;
        let audio = response.bytes().await?;
        debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio)
    }

    pub async fn get_student_profile(&self) -> Result<StudentProfile, ClientError> {
        let request = self.http.get(self.url("/api/v1/students/profile"));
        let response = self.check(self.authorize(request).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Saves the student profile and returns the backend's updated copy.
    pub async fn update_student_profile(
        &self,
        profile: &StudentProfile,
    ) -> Result<StudentProfile, ClientError> {
        let request = self
            .http
            .put(self.url("/api/v1/students/profile"))
            .json(profile);
        let response = self.check(self.authorize(request).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Fetches the server-computed candidate matches for a job posting.
    pub async fn get_job_matches(&self, job_id: &str) -> Result<JobMatches, ClientError> {
        let request = self
            .http
            .get(self.url(&format!("/api/v1/jobs/{job_id}/matches")));
        let response = self.check(self.authorize(request).send().await?).await?;
        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Maps non-2xx responses into `ClientError`. A 401 drops the stored
    /// session before surfacing, so the shell can route to sign-in.
    async fn check(&self, response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("backend returned 401; clearing session");
            self.session.clear();
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

/// File extension matching the negotiated recorder MIME type.
fn extension_for(mime_type: &str) -> &'static str {
    if mime_type.starts_with("audio/mp4") {
        "mp4"
    } else {
        "webm"
    }
}
