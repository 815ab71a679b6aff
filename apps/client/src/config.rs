use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
/// Only the backend base URL is required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    /// BCP-47 language tag sent with every voice answer.
    pub language: String,
    pub speech_model: String,
    pub speech_voice: String,
    pub speech_format: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("API_BASE_URL")?,
            language: env_or("ANSWER_LANGUAGE", "en"),
            speech_model: env_or("SPEECH_MODEL", "tts-1"),
            speech_voice: env_or("SPEECH_VOICE", "alloy"),
            speech_format: env_or("SPEECH_FORMAT", "mp3"),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
