// src/history/mod.rs

pub mod recorder;
pub mod sheets;
pub mod store;

pub use recorder::{SCORE_SENTINEL, extract_score, record};
pub use sheets::SheetsClient;
pub use store::{HistoryError, HistoryStore};
