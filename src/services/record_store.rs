// SPDX-License-Identifier: GPL-3.0-or-later
// src/services/record_store.rs
//
// HTTP client for the spreadsheet-backed record store.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constant::STORE_CONTENT_TYPE;
use crate::records::{Collection, Record};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no endpoint configured for {0}")]
    MissingEndpoint(Collection),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {collection} failed")]
    Http {
        collection: Collection,
        #[source]
        source: reqwest::Error,
    },

    #[error("{collection} responded with HTTP {status}")]
    Status { collection: Collection, status: u16 },

    #[error("{collection} returned a response that is not JSON")]
    Malformed {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("record store error: {0}")]
    Remote(String),
}

/// Result of a write or delete the store accepted for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Saved,
    Rejected(String),
}

/// Script URL for each collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub teachers: String,
    pub students: String,
    pub lessons: String,
    pub results: String,
}

impl Endpoints {
    pub fn url(&self, collection: Collection) -> Option<&str> {
        let url = match collection {
            Collection::Teachers => &self.teachers,
            Collection::Students => &self.students,
            Collection::Lessons => &self.lessons,
            Collection::Results => &self.results,
        };
        Some(url.trim()).filter(|url| !url.is_empty())
    }

    pub fn set(&mut self, collection: Collection, url: impl Into<String>) {
        let slot = match collection {
            Collection::Teachers => &mut self.teachers,
            Collection::Students => &mut self.students,
            Collection::Lessons => &mut self.lessons,
            Collection::Results => &mut self.results,
        };
        *slot = url.into();
    }
}

/// Row-oriented storage: read every row, write one, delete one.
pub trait RecordStore {
    fn read_all(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;

    fn write(
        &self,
        collection: Collection,
        record: Record,
    ) -> impl Future<Output = Result<WriteOutcome, StoreError>> + Send;

    fn delete(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<WriteOutcome, StoreError>> + Send;
}

pub struct RecordStoreClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl RecordStoreClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::Client)?;
        Ok(Self { http, endpoints })
    }

    fn endpoint(&self, collection: Collection) -> Result<&str, StoreError> {
        self.endpoints
            .url(collection)
            .ok_or(StoreError::MissingEndpoint(collection))
    }

    async fn post(&self, collection: Collection, body: Value) -> Result<WriteOutcome, StoreError> {
        let url = self.endpoint(collection)?;
        let http_err = |source| StoreError::Http { collection, source };

        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, STORE_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                collection,
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(http_err)?;
        parse_outcome(collection, &text)
    }
}

impl RecordStore for RecordStoreClient {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let url = read_url(self.endpoint(collection)?, chrono::Utc::now().timestamp_millis());
        log::debug!("Reading {collection} from {url}");

        let http_err = |source| StoreError::Http { collection, source };
        let response = self.http.get(&url).send().await.map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                collection,
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(http_err)?;
        let rows = parse_rows(collection, &text)?;
        log::info!("Read {} rows from {collection}", rows.len());
        Ok(rows)
    }

    async fn write(&self, collection: Collection, record: Record) -> Result<WriteOutcome, StoreError> {
        let mut body = Record::new();
        body.insert("action".into(), Value::from("write"));
        body.extend(record);

        let outcome = self.post(collection, Value::Object(body)).await?;
        log::info!("Write to {collection}: {outcome:?}");
        Ok(outcome)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<WriteOutcome, StoreError> {
        let mut body = Record::new();
        body.insert("action".into(), Value::from("delete"));
        body.insert("id".into(), Value::from(id));

        let outcome = self.post(collection, Value::Object(body)).await?;
        log::info!("Delete {id} from {collection}: {outcome:?}");
        Ok(outcome)
    }
}

/// Read URL with a cache-busting timestamp.
fn read_url(base: &str, millis: i64) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}action=read&_t={millis}")
}

fn error_message(object: &Record) -> Option<String> {
    object
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|m| !m.trim().is_empty())
}

fn parse_rows(collection: Collection, body: &str) -> Result<Vec<Record>, StoreError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|source| StoreError::Malformed { collection, source })?;

    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect()),
        Value::Object(object)
            if object.get("status").and_then(Value::as_str) == Some("error") =>
        {
            Err(StoreError::Remote(
                error_message(&object).unwrap_or_else(|| "unknown error".into()),
            ))
        }
        _ => Ok(Vec::new()),
    }
}

fn parse_outcome(collection: Collection, body: &str) -> Result<WriteOutcome, StoreError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|source| StoreError::Malformed { collection, source })?;

    let Value::Object(object) = value else {
        return Ok(WriteOutcome::Rejected("unexpected response".into()));
    };

    match object.get("status").and_then(Value::as_str) {
        Some("success") => Ok(WriteOutcome::Saved),
        _ => Ok(WriteOutcome::Rejected(
            error_message(&object).unwrap_or_else(|| "write was not accepted".into()),
        )),
    }
}

/// In-process store for workflow tests.
#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::records::row_id;

    #[derive(Default)]
    pub struct MemoryStore {
        tables: Mutex<HashMap<Collection, Vec<Record>>>,
    }

    impl MemoryStore {
        pub fn with_rows(collection: Collection, rows: Vec<Value>) -> Self {
            let store = Self::default();
            store.insert(collection, rows);
            store
        }

        pub fn insert(&self, collection: Collection, rows: Vec<Value>) {
            let rows = rows.into_iter().filter_map(|row| match row {
                Value::Object(row) => Some(row),
                _ => None,
            });
            self.tables
                .lock()
                .unwrap()
                .entry(collection)
                .or_default()
                .extend(rows);
        }

        pub fn rows(&self, collection: Collection) -> Vec<Record> {
            self.tables
                .lock()
                .unwrap()
                .get(&collection)
                .cloned()
                .unwrap_or_default()
        }
    }

    impl RecordStore for MemoryStore {
        async fn read_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
            Ok(self.rows(collection))
        }

        async fn write(
            &self,
            collection: Collection,
            record: Record,
        ) -> Result<WriteOutcome, StoreError> {
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(collection).or_default();
            let id = row_id(&record);
            match rows
                .iter_mut()
                .find(|row| id.is_some() && row_id(row) == id)
            {
                Some(row) => *row = record,
                None => rows.push(record),
            }
            Ok(WriteOutcome::Saved)
        }

        async fn delete(&self, collection: Collection, id: &str) -> Result<WriteOutcome, StoreError> {
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(collection).or_default();
            let before = rows.len();
            rows.retain(|row| row_id(row).as_deref() != Some(id));
            if rows.len() < before {
                Ok(WriteOutcome::Saved)
            } else {
                Ok(WriteOutcome::Rejected(format!("no row {id}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_url_appends_cache_buster() {
        assert_eq!(
            read_url("https://script.test/exec", 42),
            "https://script.test/exec?action=read&_t=42"
        );
        assert_eq!(
            read_url("https://script.test/exec?key=1", 42),
            "https://script.test/exec?key=1&action=read&_t=42"
        );
    }

    #[test]
    fn rows_from_array() {
        let rows = parse_rows(Collection::Lessons, r#"[{"code":"A"}, 3, {"code":"B"}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["code"], "B");
    }

    #[test]
    fn error_object_becomes_remote_error() {
        let err = parse_rows(
            Collection::Teachers,
            r#"{"status":"error","message":"Sheet not found"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Remote(msg) if msg == "Sheet not found"));
    }

    #[test]
    fn other_json_is_empty() {
        assert!(parse_rows(Collection::Results, r#"{"status":"ok"}"#).unwrap().is_empty());
        assert!(parse_rows(Collection::Results, "null").unwrap().is_empty());
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_rows(Collection::Students, "<html>").unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn write_outcomes() {
        assert_eq!(
            parse_outcome(Collection::Lessons, r#"{"status":"success"}"#).unwrap(),
            WriteOutcome::Saved
        );
        assert_eq!(
            parse_outcome(Collection::Lessons, r#"{"status":"error","message":"locked"}"#).unwrap(),
            WriteOutcome::Rejected("locked".into())
        );
    }

    #[test]
    fn endpoints_ignore_blank_urls() {
        let mut endpoints = Endpoints::default();
        assert_eq!(endpoints.url(Collection::Lessons), None);
        endpoints.set(Collection::Lessons, " https://script.test/lessons ");
        assert_eq!(endpoints.url(Collection::Lessons), Some("https://script.test/lessons"));
    }

    #[tokio::test]
    async fn client_without_endpoint_fails_early() {
        let client = RecordStoreClient::new(Endpoints::default(), Duration::from_secs(1)).unwrap();
        let err = client.read_all(Collection::Teachers).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingEndpoint(Collection::Teachers)));
    }
}
