// src/models/record.rs

use serde::Serialize;

/// One practice attempt as archived in the external tabular store.
///
/// Rows are parsed leniently: the store is externally owned and hand-edits
/// happen, so missing cells become empty strings and a non-numeric score
/// cell (including the "N/A" sentinel) becomes `None`.
#[derive(Debug, Clone, Serialize)]
pub struct PracticeRecord {
    pub recorded_at: String,
    pub theme: String,
    pub score: Option<i64>,
    pub answer: String,
    pub feedback: String,
}

impl PracticeRecord {
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            recorded_at: cell(0),
            theme: cell(1),
            score: cell(2).trim().parse().ok(),
            answer: cell(3),
            feedback: cell(4),
        }
    }
}

/// Aggregates over the numeric score column. Sentinel and malformed score
/// cells are excluded from mean/max, not treated as zero.
#[derive(Debug, Serialize)]
pub struct HistorySummary {
    pub attempts: usize,
    pub mean_score: Option<f64>,
    pub max_score: Option<i64>,
}

/// Payload of the history view. `available: false` covers both missing
/// configuration and a failing store; the UI shows an empty state either way.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub available: bool,
    pub records: Vec<PracticeRecord>,
    pub summary: Option<HistorySummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_row() {
        let cells: Vec<String> = ["2026-08-07T10:00:00Z", "Leadership vision", "18", "answer", "feedback"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let record = PracticeRecord::from_cells(&cells);
        assert_eq!(record.theme, "Leadership vision");
        assert_eq!(record.score, Some(18));
        assert_eq!(record.feedback, "feedback");
    }

    #[test]
    fn sentinel_and_short_rows_degrade_gracefully() {
        let cells: Vec<String> = ["2026-08-07T10:00:00Z", "Crisis management", "N/A"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let record = PracticeRecord::from_cells(&cells);
        assert_eq!(record.score, None);
        assert_eq!(record.answer, "");
        assert_eq!(record.feedback, "");
    }
}
