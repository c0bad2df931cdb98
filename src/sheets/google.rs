//! Google Sheets v4 REST adapter.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error};

use super::token::{ServiceAccountKey, TokenSource};
use super::{CellRange, Row, TabularStore};
use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

// Cells are stored exactly as sent, never parsed as formulas or numbers.
const VALUE_INPUT_OPTION: &str = "RAW";

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// One spreadsheet, addressed by its id. The client is constructed once at startup
/// and shared through the repository.
pub struct GoogleSheetsStore {
    http: reqwest::Client,
    base: Url,
    spreadsheet_id: String,
    tokens: TokenSource,
    // title -> numeric sheet id, needed for structural row deletion
    sheet_ids: Cache<String, i64>,
}

impl GoogleSheetsStore {
    pub fn new(
        api_base: &str,
        spreadsheet_id: impl Into<String>,
        key: ServiceAccountKey,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            tokens: TokenSource::new(key, http.clone()),
            http,
            base: Url::parse(api_base)?,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_ids: Cache::builder()
                .max_capacity(64)
                .time_to_live(Duration::from_secs(3600))
                .build(),
        })
    }

    fn url(&self, tail: &[&str]) -> AppResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::store("spreadsheet API base cannot be a base URL"))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .extend(tail);
        Ok(url)
    }

    fn values_url(&self, sheet: &str, range: &str, suffix: &str) -> AppResult<Url> {
        self.url(&["values", &format!("{sheet}!{range}{suffix}")])
    }

    fn append_url(&self, sheet: &str) -> AppResult<Url> {
        let mut url = self.values_url(sheet, "A1", ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION)
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }

    fn update_url(&self, sheet: &str, a1: &str) -> AppResult<Url> {
        let mut url = self.values_url(sheet, a1, "")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> AppResult<reqwest::Response> {
        let token = self.tokens.access_token().await?;
        let mut request = self.http.request(method.clone(), url.clone()).bearer_auth(token.as_str());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, %method, path = url.path(), "Spreadsheet request failed");
            AppError::store(e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!(%status, %method, path = url.path(), body = %text, "Spreadsheet API returned an error");
            return Err(AppError::store(format!("spreadsheet API returned {status}")));
        }
        Ok(response)
    }

    async fn sheet_id(&self, sheet: &str) -> AppResult<i64> {
        if let Some(id) = self.sheet_ids.get(sheet).await {
            return Ok(id);
        }

        let mut url = self.url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let meta: SpreadsheetMeta = self
            .send(Method::GET, url, None)
            .await?
            .json()
            .await
            .map_err(AppError::store)?;

        for s in &meta.sheets {
            self.sheet_ids
                .insert(s.properties.title.clone(), s.properties.sheet_id)
                .await;
        }

        meta.sheets
            .into_iter()
            .find(|s| s.properties.title == sheet)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| AppError::store(format!("sheet '{sheet}' not found")))
    }
}

fn cell_from_json(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn row_to_json(row: Row) -> Vec<Value> {
    // A JSON null means "leave unchanged" to the API, so blanks are written as "".
    row.into_iter()
        .map(|c| Value::String(c.unwrap_or_default()))
        .collect()
}

#[async_trait]
impl TabularStore for GoogleSheetsStore {
    async fn read_range(&self, sheet: &str, range: CellRange) -> AppResult<Vec<Row>> {
        let mut url = self.values_url(sheet, &range.to_string(), "")?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");

        debug!(sheet, %range, "Reading range");
        let body: ValueRange = self
            .send(Method::GET, url, None)
            .await?
            .json()
            .await
            .map_err(AppError::store)?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_from_json).collect())
            .collect())
    }

    async fn append_row(&self, sheet: &str, values: Row) -> AppResult<()> {
        let url = self.append_url(sheet)?;
        debug!(sheet, "Appending row");
        self.send(Method::POST, url, Some(json!({ "values": [row_to_json(values)] })))
            .await?;
        Ok(())
    }

    async fn update_range(&self, sheet: &str, range: CellRange, values: Vec<Row>) -> AppResult<()> {
        let a1 = range.to_string();
        let url = self.update_url(sheet, &a1)?;
        let values: Vec<Vec<Value>> = values.into_iter().map(row_to_json).collect();
        debug!(sheet, range = %a1, "Updating range");
        self.send(
            Method::PUT,
            url,
            Some(json!({
                "range": format!("{sheet}!{a1}"),
                "majorDimension": "ROWS",
                "values": values,
            })),
        )
        .await?;
        Ok(())
    }

    async fn delete_row(&self, sheet: &str, row_number: u32) -> AppResult<()> {
        if row_number == 0 {
            return Err(AppError::store("row numbers are 1-based"));
        }
        let sheet_id = self.sheet_id(sheet).await?;
        let url = self.url(&[])?;
        // batchUpdate lives on "<id>:batchUpdate", not under a sub-path
        let url = Url::parse(&format!("{}:batchUpdate", url.as_str().trim_end_matches('/')))
            .map_err(AppError::store)?;

        debug!(sheet, sheet_id, row_number, "Deleting row");
        self.send(
            Method::POST,
            url,
            Some(json!({
                "requests": [{
                    "deleteDimension": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "ROWS",
                            "startIndex": row_number - 1,
                            "endIndex": row_number,
                        }
                    }
                }]
            })),
        )
        .await?;
        Ok(())
    }
}
