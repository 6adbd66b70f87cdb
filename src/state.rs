// src/state.rs

use std::sync::Arc;

use crate::config::Config;
use crate::generation::GenerationBackend;
use crate::history::HistoryStore;
use crate::session::SessionStore;

/// Shared application state.
///
/// The two external boundaries are held as trait objects so tests can swap
/// in in-process fakes, and as `Option`s so a missing credential disables
/// just that feature instead of the whole process.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub generator: Option<Arc<dyn GenerationBackend>>,
    pub history: Option<Arc<dyn HistoryStore>>,
}
