// src/handlers/history.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    models::record::{HistoryResponse, HistorySummary, PracticeRecord},
    state::AppState,
};

/// Lists past practice records with summary statistics.
///
/// The store is externally owned and best-effort: missing configuration or
/// a failing read both degrade to `available: false` with an empty list,
/// never to an error response.
pub async fn list_history(State(state): State<AppState>) -> impl IntoResponse {
    let Some(store) = &state.history else {
        return Json(unavailable());
    };

    match store.read_all().await {
        Ok(rows) => {
            let records: Vec<PracticeRecord> =
                rows.iter().map(|cells| PracticeRecord::from_cells(cells)).collect();
            let summary = summarize(&records);
            Json(HistoryResponse {
                available: true,
                records,
                summary: Some(summary),
            })
        }
        Err(err) => {
            tracing::warn!("failed to read practice history: {}", err);
            Json(unavailable())
        }
    }
}

fn unavailable() -> HistoryResponse {
    HistoryResponse {
        available: false,
        records: Vec::new(),
        summary: None,
    }
}

/// Count covers every attempt; mean and max cover only rows whose score
/// cell is numeric. Sentinel rows are excluded, not counted as zero.
fn summarize(records: &[PracticeRecord]) -> HistorySummary {
    let scores: Vec<i64> = records.iter().filter_map(|r| r.score).collect();

    HistorySummary {
        attempts: records.len(),
        mean_score: if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<i64>() as f64 / scores.len() as f64)
        },
        max_score: scores.iter().copied().max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: Option<i64>) -> PracticeRecord {
        PracticeRecord {
            recorded_at: "2026-08-07T10:00:00Z".to_string(),
            theme: "Leadership vision".to_string(),
            score,
            answer: "answer".to_string(),
            feedback: "feedback".to_string(),
        }
    }

    #[test]
    fn sentinel_rows_are_excluded_from_aggregates_but_counted() {
        let records = vec![record(Some(18)), record(None), record(Some(22))];
        let summary = summarize(&records);

        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.mean_score, Some(20.0));
        assert_eq!(summary.max_score, Some(22));
    }

    #[test]
    fn all_sentinels_yield_empty_aggregates() {
        let records = vec![record(None), record(None)];
        let summary = summarize(&records);

        assert_eq!(summary.attempts, 2);
        assert_eq!(summary.mean_score, None);
        assert_eq!(summary.max_score, None);
    }

    #[test]
    fn no_records_at_all() {
        let summary = summarize(&[]);
        assert_eq!(summary.attempts, 0);
        assert_eq!(summary.mean_score, None);
    }
}
