//! Client core for the Hirewise career platform.
//!
//! Everything the web frontend drives that is not markup lives here:
//! progress-analytics bucketing, coding-profile normalization, the local
//! company-fit estimate, the voice-answer recording session, and the typed
//! client for the platform backend. The backend owns all real matching,
//! scoring, and transcription intelligence — this crate only moves shapes
//! and keeps the client-side state machines honest.

pub mod analytics;
pub mod api;
pub mod config;
pub mod errors;
pub mod interview;
pub mod matching;
pub mod profiles;
pub mod session;
pub mod telemetry;
