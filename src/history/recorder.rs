// src/history/recorder.rs

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use super::store::HistoryStore;

/// Stored in the score column when no score can be extracted from the
/// feedback text. History aggregates skip it instead of counting it as zero.
pub const SCORE_SENTINEL: &str = "N/A";

/// Feedback is free text of arbitrary length; only the head is archived.
const FEEDBACK_CELL_LIMIT: usize = 500;

/// Best-effort extraction of the "N/25" score marker from feedback text.
pub fn extract_score(feedback: &str) -> Option<i64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})\s*/\s*25\b").expect("score pattern is valid")
    });

    pattern
        .captures(feedback)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Appends one practice record to the external store.
///
/// Fire-and-forget, at-most-once: every failure is converted to `false`
/// with a warn log and never interrupts the caller's flow.
pub async fn record(store: &dyn HistoryStore, theme: &str, answer: &str, feedback: &str) -> bool {
    let score_cell = extract_score(feedback)
        .map(|s| s.to_string())
        .unwrap_or_else(|| SCORE_SENTINEL.to_string());

    let row = vec![
        Utc::now().to_rfc3339(),
        theme.to_string(),
        score_cell,
        answer.to_string(),
        truncate_chars(feedback, FEEDBACK_CELL_LIMIT),
    ];

    match store.append_row(row).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("failed to record practice attempt: {}", err);
            false
        }
    }
}

/// Char-boundary-safe truncation.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::store::HistoryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn extracts_plain_score_marker() {
        assert_eq!(extract_score("Solid answer. 18/25"), Some(18));
    }

    #[test]
    fn extracts_labelled_score_with_spaces() {
        assert_eq!(extract_score("...\nScore: 21 / 25\n"), Some(21));
    }

    #[test]
    fn missing_marker_yields_none() {
        assert_eq!(extract_score("Great answer, keep it up!"), None);
        assert_eq!(extract_score("You got 18 out of 30"), None);
    }

    #[test]
    fn date_fragments_do_not_match() {
        // "14/25" inside 2014/25 must not be read as a score.
        assert_eq!(extract_score("As seen in 2014/25 reports"), None);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "品格教育".repeat(200);
        let truncated = truncate_chars(&text, FEEDBACK_CELL_LIMIT);
        assert_eq!(truncated.chars().count(), FEEDBACK_CELL_LIMIT);
        assert!(text.starts_with(&truncated));
    }

    struct MemoryStore {
        rows: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl HistoryStore for MemoryStore {
        async fn append_row(&self, cells: Vec<String>) -> Result<(), HistoryError> {
            if self.fail {
                return Err(HistoryError::Rejected("403 Forbidden".to_string()));
            }
            self.rows.lock().unwrap().push(cells);
            Ok(())
        }

        async fn read_all(&self) -> Result<Vec<Vec<String>>, HistoryError> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn records_sentinel_when_score_is_missing() {
        let store = MemoryStore {
            rows: Mutex::new(Vec::new()),
            fail: false,
        };

        let ok = record(&store, "Leadership vision", "my answer", "no score here").await;
        assert!(ok);

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "Leadership vision");
        assert_eq!(rows[0][2], SCORE_SENTINEL);
        assert_eq!(rows[0][3], "my answer");
    }

    #[tokio::test]
    async fn store_failure_becomes_false_not_an_error() {
        let store = MemoryStore {
            rows: Mutex::new(Vec::new()),
            fail: true,
        };

        let ok = record(&store, "Leadership vision", "my answer", "18/25").await;
        assert!(!ok);
    }
}
