//! Google Sheets API v4 client
//!
//! Blocking HTTP client for the `spreadsheets.values` endpoints. Requests
//! carry a bearer token; obtaining the token is left to the caller.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::SheetsClient;
use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::layout::CellRange;

/// Default API endpoint
const API_BASE: &str = "https://sheets.googleapis.com";

/// Request timeout in seconds
const REQUEST_TIMEOUT: u64 = 60;

/// Client for one spreadsheet
pub struct GoogleSheetsClient {
    http: Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    updated_rows: Option<u32>,
}

impl GoogleSheetsClient {
    /// Create a client for `spreadsheet_id`
    pub fn new(spreadsheet_id: impl Into<String>, access_token: Option<String>) -> SyncResult<Self> {
        let spreadsheet_id = spreadsheet_id.into();
        if spreadsheet_id.is_empty() {
            return Err(SyncError::Config(
                "spreadsheet_id is not set (config file or POSYNC_SPREADSHEET_ID)".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .user_agent(concat!("posync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SyncError::remote)?;

        Ok(Self {
            http,
            base_url: API_BASE.to_string(),
            spreadsheet_id,
            access_token,
        })
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config) -> SyncResult<Self> {
        Self::new(config.spreadsheet_id.clone(), config.access_token.clone())
    }

    /// Point the client at another endpoint (e.g. a local emulator)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `<base>/v4/spreadsheets/<id>[/values/<range>]`
    fn url(&self, range: Option<&CellRange>) -> SyncResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(SyncError::remote)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SyncError::remote(format!("invalid base URL: {}", self.base_url)))?;
            segments
                .pop_if_empty()
                .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()]);
            if let Some(range) = range {
                segments.extend(["values", range.a1().as_str()]);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder, what: &str) -> SyncResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .map_err(|e| SyncError::remote(format!("{}: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SyncError::remote(format!(
                "{}: HTTP {}: {}",
                what,
                status,
                body.trim()
            )));
        }
        Ok(response)
    }
}

impl SheetsClient for GoogleSheetsClient {
    fn sheet_names(&self) -> SyncResult<Vec<String>> {
        let mut url = self.url(None)?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let spreadsheet: Spreadsheet = self
            .send(self.http.get(url), "fetching sheet list")?
            .json()
            .map_err(SyncError::remote)?;

        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    fn read(&self, range: &CellRange) -> SyncResult<Vec<Vec<String>>> {
        let url = self.url(Some(range))?;
        let what = format!("reading {}", range);

        let value_range: ValueRange = self
            .send(self.http.get(url), &what)?
            .json()
            .map_err(SyncError::remote)?;

        debug!("{} rows retrieved from {}", value_range.values.len(), range);
        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    fn write(&self, range: &CellRange, rows: &[Vec<String>]) -> SyncResult<()> {
        let mut url = self.url(Some(range))?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let what = format!("writing {}", range);

        let body = serde_json::json!({
            "range": range.a1(),
            "majorDimension": "ROWS",
            "values": rows,
        });

        let response: UpdateResponse = self
            .send(self.http.put(url).json(&body), &what)?
            .json()
            .map_err(SyncError::remote)?;

        debug!(
            "Updated {} rows in {}",
            response.updated_rows.unwrap_or(0),
            range
        );
        Ok(())
    }
}

/// Cells normally arrive as strings; anything else is rendered as text
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
