// src/history/sheets.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::store::{HistoryError, HistoryStore};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// All practice records live on the first sheet, columns A-E:
/// timestamp, theme, score, answer, feedback.
const RANGE: &str = "Sheet1!A:E";

/// HTTP client for the Sheets v4 `values:append` / `values` endpoints.
pub struct SheetsClient {
    http: reqwest::Client,
    token: String,
    spreadsheet_id: String,
    base_url: String,
}

#[derive(Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsClient {
    pub fn new(token: String, spreadsheet_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            spreadsheet_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, HistoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(HistoryError::Rejected(format!("{}: {}", status, body)))
    }
}

#[async_trait]
impl HistoryStore for SheetsClient {
    async fn append_row(&self, cells: Vec<String>) -> Result<(), HistoryError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.base_url, self.spreadsheet_id, RANGE
        );

        let response = self
            .http
            .post(&url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(&self.token)
            .json(&AppendRequest { values: vec![cells] })
            .send()
            .await
            .map_err(|e| HistoryError::Request(e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Vec<String>>, HistoryError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, RANGE
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| HistoryError::Request(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| HistoryError::Request(e.to_string()))?;

        Ok(range.values)
    }
}
