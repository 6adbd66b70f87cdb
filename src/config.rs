// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

/// Default fallback order for generation models, most capable first.
/// The provider's catalog of live model names shifts over time, so older
/// names are kept at the tail as a safety net.
const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
    "gemini-pro",
];

#[derive(Debug, Clone)]
pub struct Config {
    /// Shared access password for the gate. `None` means the gate is
    /// permanently locked: every login attempt is rejected.
    pub access_password: Option<String>,

    pub jwt_secret: String,
    pub jwt_expiration: u64,

    /// Credential for the text-generation service. `None` disables the
    /// generation endpoints without affecting the rest of the app.
    pub gemini_api_key: Option<String>,

    /// Ordered list of model identifiers to try for batch generation.
    pub model_candidates: Vec<String>,

    /// Single long bound covering one whole generation call.
    pub generation_timeout: Duration,

    /// Credential and target id for the external tabular history store.
    /// Absence of either silently degrades the history feature.
    pub sheets_api_token: Option<String>,
    pub spreadsheet_id: Option<String>,

    /// Practice countdown length in seconds.
    pub timer_seconds: u64,

    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(28800);

        let model_candidates = env::var("GEMINI_MODELS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<String>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_MODEL_CANDIDATES
                    .iter()
                    .map(|m| m.to_string())
                    .collect()
            });

        let generation_timeout = Duration::from_secs(
            env::var("GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        );

        let timer_seconds = env::var("TIMER_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(240);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            access_password: non_empty_var("ACCESS_PASSWORD"),
            jwt_secret,
            jwt_expiration,
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            model_candidates,
            generation_timeout,
            sheets_api_token: non_empty_var("SHEETS_API_TOKEN"),
            spreadsheet_id: non_empty_var("SPREADSHEET_ID"),
            timer_seconds,
            rust_log,
        }
    }
}

/// Treats an empty environment variable the same as an absent one, so a
/// blank `ACCESS_PASSWORD=` in a .env file still fails closed.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}
