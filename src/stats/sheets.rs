use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt;

use crate::config::SheetConfig;

/// Range requested from every source tab.
const SOURCE_RANGE: &str = "A1:ZZ";

#[derive(Debug)]
pub enum SheetsError {
    Http(reqwest::Error),
    Api { status: u16, body: String },
    InvalidUrl(String),
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetsError::Http(e) => write!(f, "HTTP error: {e}"),
            SheetsError::Api { status, body } => write!(f, "sheets API returned {status}: {body}"),
            SheetsError::InvalidUrl(url) => write!(f, "invalid sheets API url: {url}"),
        }
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(e: reqwest::Error) -> Self {
        SheetsError::Http(e)
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    properties: SpreadsheetProperties,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

/// Minimal Google Sheets v4 client: cell values and document title.
pub struct SheetsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SheetsClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Fetch all cell values of the configured tab as rows of strings.
    /// Rows are ragged: trailing empty cells are omitted by the API.
    pub async fn fetch_values(&self, sheet: &SheetConfig) -> Result<Vec<Vec<String>>, SheetsError> {
        let range = format!("'{}'!{SOURCE_RANGE}", sheet.tab);
        let url = self.url(&["v4", "spreadsheets", &sheet.sheet_id, "values", &range])?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }

    pub async fn fetch_title(&self, sheet: &SheetConfig) -> Result<String, SheetsError> {
        let mut url = self.url(&["v4", "spreadsheets", &sheet.sheet_id])?;
        url.query_pairs_mut().append_pair("fields", "properties.title");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let spreadsheet: Spreadsheet = response.json().await?;
        Ok(spreadsheet.properties.title)
    }

    /// Public link to a spreadsheet document.
    pub fn document_url(sheet: &SheetConfig) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", sheet.sheet_id)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| SheetsError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        if let Some(ref key) = self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}
