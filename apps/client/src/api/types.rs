//! Wire shapes for the platform backend. The backend owns the exact wire
//! format; only the fields this core consumes are modeled.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A mock-interview session as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub questions_target: u32,
    pub status: String,
    pub questions: Vec<Question>,
    pub difficulty: String,
    pub interviewer_persona: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Response to a submitted voice answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceAnswer {
    pub transcription: String,
}

/// Request body for speech synthesis. Audio comes back as raw bytes, is
/// played locally, and is never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: String,
    pub model: String,
    pub voice: String,
    pub response_format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodingProfiles {
    #[serde(default)]
    pub leetcode: Option<String>,
    #[serde(default)]
    pub hackerrank: Option<String>,
}

/// Raw per-platform stat block. `calendar` maps stringified epoch seconds
/// to daily submission counts and feeds the calendar bucketizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    #[serde(default)]
    pub calendar: HashMap<String, i64>,
    #[serde(default)]
    pub total_solved: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    /// Skill name → raw score 0–100, as edited on the skill radar.
    #[serde(default)]
    pub skill_radar: HashMap<String, f64>,
    #[serde(default)]
    pub coding_profiles: CodingProfiles,
    #[serde(default)]
    pub leetcode_stats: Option<PlatformStats>,
    #[serde(default)]
    pub hackerrank_stats: Option<PlatformStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatches {
    pub matches: Vec<JobMatch>,
}

/// A server-computed candidate match. This score is authoritative; the
/// local estimate in `matching` is only a preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub student_id: String,
    pub match_score: u32,
    pub match_reason: String,
    #[serde(default)]
    pub skills_matched: Vec<String>,
}
