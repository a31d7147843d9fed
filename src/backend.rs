use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::models::Event;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("city-scout/0.1")
        .build()
        .expect("failed to build backend client")
});

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not authenticated")]
    Auth,
}

/// The one seam between the pure core and the hosted backend. The filtering
/// and aggregation code never calls this; it only receives the resolved
/// snapshots as plain arguments.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<Event>, BackendError>;
    /// Saved-event ids for a user; an unauthenticated session yields an
    /// empty list, not an error.
    async fn fetch_saved_ids(&self, user_id: Option<&str>) -> Result<Vec<String>, BackendError>;
    async fn save_event(&self, user_id: &str, event_id: &str) -> Result<(), BackendError>;
    async fn unsave_event(&self, user_id: &str, event_id: &str) -> Result<(), BackendError>;
}

/// Collapse a failed fetch into an empty snapshot so the pure core runs on
/// "no data"; the caller surfaces the failure as UI state, never as a panic.
pub fn events_or_empty(result: Result<Vec<Event>, BackendError>) -> Vec<Event> {
    match result {
        Ok(events) => events,
        Err(err) => {
            eprintln!("event fetch failed: {err}");
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SavedRow {
    event_id: String,
}

/// PostgREST-style hosted backend.
pub struct RestBackend {
    base_url: String,
    api_key: Option<String>,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.backend_url.clone(), config.backend_api_key.clone())
    }

    fn table_url(&self, table: &str) -> Result<Url, BackendError> {
        let base = format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table);
        Url::parse(&base).map_err(|err| BackendError::Http(err.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        let mut request = CLIENT.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::Http(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| BackendError::Http(err.to_string()))?;
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(BackendError::Auth);
        }
        if !status.is_success() {
            return Err(BackendError::Http(format!("status {status}: {body}")));
        }
        serde_json::from_str(&body).map_err(|err| BackendError::Parse(err.to_string()))
    }
}

#[async_trait]
impl EventSource for RestBackend {
    async fn fetch_events(&self) -> Result<Vec<Event>, BackendError> {
        let mut url = self.table_url("events")?;
        url.query_pairs_mut().append_pair("select", "*");
        self.get_json(url).await
    }

    async fn fetch_saved_ids(&self, user_id: Option<&str>) -> Result<Vec<String>, BackendError> {
        let user_id = match user_id {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };
        let mut url = self.table_url("saved_events")?;
        url.query_pairs_mut()
            .append_pair("select", "event_id")
            .append_pair("user_id", &format!("eq.{user_id}"));
        let rows: Vec<SavedRow> = self.get_json(url).await?;
        Ok(rows.into_iter().map(|row| row.event_id).collect())
    }

    async fn save_event(&self, user_id: &str, event_id: &str) -> Result<(), BackendError> {
        let url = self.table_url("saved_events")?;
        let mut request = CLIENT
            .post(url)
            .json(&serde_json::json!({ "user_id": user_id, "event_id": event_id }));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::Http(err.to_string()))?;
        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(BackendError::Auth);
        }
        if !status.is_success() {
            return Err(BackendError::Http(format!("status {status}")));
        }
        Ok(())
    }

    async fn unsave_event(&self, user_id: &str, event_id: &str) -> Result<(), BackendError> {
        let mut url = self.table_url("saved_events")?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{user_id}"))
            .append_pair("event_id", &format!("eq.{event_id}"));
        let mut request = CLIENT.delete(url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::Http(err.to_string()))?;
        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(BackendError::Auth);
        }
        if !status.is_success() {
            return Err(BackendError::Http(format!("status {status}")));
        }
        Ok(())
    }
}
