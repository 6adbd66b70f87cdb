// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use oralcoach::config::Config;
use oralcoach::generation::{GeminiClient, GenerationBackend};
use oralcoach::history::{HistoryStore, SheetsClient};
use oralcoach::routes;
use oralcoach::session::SessionStore;
use oralcoach::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if config.access_password.is_none() {
        tracing::warn!("ACCESS_PASSWORD is unset; the gate is locked and no one can log in");
    }

    // Wire the generation backend; absence of the credential disables the
    // generation endpoints but the server still starts.
    let generator: Option<Arc<dyn GenerationBackend>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiClient::new(
            key.clone(),
            config.generation_timeout,
        ))),
        None => {
            tracing::warn!("GEMINI_API_KEY is unset; question generation is disabled");
            None
        }
    };

    // Wire the history store; it needs both the credential and the target id.
    let history: Option<Arc<dyn HistoryStore>> =
        match (&config.sheets_api_token, &config.spreadsheet_id) {
            (Some(token), Some(sheet)) => {
                Some(Arc::new(SheetsClient::new(token.clone(), sheet.clone())))
            }
            _ => {
                tracing::warn!("history store is not configured; practice history is disabled");
                None
            }
        };

    let sessions = Arc::new(SessionStore::new(Duration::from_secs(config.jwt_expiration)));

    // Create AppState
    let state = AppState {
        config,
        sessions,
        generator,
        history,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
