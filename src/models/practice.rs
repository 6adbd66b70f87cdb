// src/models/practice.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DTO for requesting a new question. The topic may be one of the presets
/// or any free text; both are accepted verbatim.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,

    /// Optional reference material the question should be grounded in.
    pub grounding_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub question: String,
    pub theme: String,

    /// Which candidate model actually answered.
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub chars: usize,
}

/// DTO for submitting an answer for evaluation. When `answer` is absent the
/// stored draft is evaluated instead.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub feedback: String,
    pub score: Option<i64>,

    /// Whether the attempt made it into the external history store.
    /// `false` never blocks the evaluation itself.
    pub recorded: bool,
}

#[derive(Debug, Serialize)]
pub struct StructureResponse {
    pub structure: String,

    /// True when the hint came from the session cache rather than a fresh
    /// generation call.
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct TimerResponse {
    pub armed: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_secs: u64,
    pub remaining_secs: u64,
}

/// The reload-resilient snapshot a client renders from: everything the
/// session currently knows, with the countdown freshly derived.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub question: Option<String>,
    pub theme: String,
    pub draft_chars: usize,
    pub feedback: Option<String>,
    pub structure: Option<String>,
    pub timer: TimerResponse,
}
