// src/services/meilisearch.rs

//! Meilisearch REST client.
//!
//! Covers index creation, document replacement and task polling. Every write
//! is enqueued server side; callers wait on the returned task uid.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, SearchConfig, VideoRecord};
use crate::services::{SearchBackend, TaskUid};
use crate::utils::http;

const SERVICE: &str = "Meilisearch";

/// Primary key of every video index.
pub const PRIMARY_KEY: &str = "id";

/// Summary returned when a task is enqueued.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub task_uid: TaskUid,
}

/// Processing state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Whether the task reached a final state.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// A task as reported by `GET /tasks/{uid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub uid: TaskUid,
    pub status: TaskStatus,
    #[serde(default)]
    pub error: Option<TaskError>,
}

impl Task {
    pub fn failure_message(&self) -> String {
        match (&self.error, self.status) {
            (Some(error), _) => format!("{} ({})", error.message, error.code),
            (None, TaskStatus::Canceled) => "task was canceled".to_string(),
            (None, status) => format!("task ended with status {status:?}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
}

/// Error body of a rejected request.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for a single Meilisearch server.
pub struct MeiliClient {
    client: Client,
    base_url: Url,
    master_key: Option<String>,
}

impl MeiliClient {
    /// Create a client and check that the server answers its health probe.
    pub async fn connect(search: &SearchConfig, http_config: &HttpConfig) -> Result<Self> {
        let client = Self::new(search, http_config)?;

        client
            .request(Method::GET, &["health"])?
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::connectivity(client.base_url.as_str(), e))?;

        log::info!("Connected to Meilisearch at {}", client.base_url);
        Ok(client)
    }

    /// Create a client without contacting the server.
    fn new(search: &SearchConfig, http_config: &HttpConfig) -> Result<Self> {
        let address = search.url.trim_end_matches('/');
        let base_url = Url::parse(address).map_err(|e| AppError::connectivity(address, e))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::connectivity(address, "not an http address"));
        }

        Ok(Self {
            client: http::create_client(http_config)?,
            base_url,
            master_key: search.master_key.clone().filter(|k| !k.is_empty()),
        })
    }

    /// URL for a path below the server address. Each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::connectivity(self.base_url.as_str(), "not an http address"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.master_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        Ok(self.authorize(self.client.request(method, url)))
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(AppError::api(SERVICE, status.as_u16(), message))
    }
}

#[async_trait]
impl SearchBackend for MeiliClient {
    async fn ensure_index(&self, index_uid: &str) -> Result<Option<TaskUid>> {
        let response = self
            .request(Method::GET, &["indexes", index_uid])?
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(None),
            StatusCode::NOT_FOUND => {
                log::info!("Creating index '{}'", index_uid);
                let body = json!({ "uid": index_uid, "primaryKey": PRIMARY_KEY });
                let info: TaskInfo =
                    Self::send_json(self.request(Method::POST, &["indexes"])?.json(&body))
                        .await?;
                Ok(Some(info.task_uid))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::api(SERVICE, status.as_u16(), body))
            }
        }
    }

    async fn delete_all_documents(&self, index_uid: &str) -> Result<TaskUid> {
        let request = self.request(Method::DELETE, &["indexes", index_uid, "documents"])?;
        let info: TaskInfo = Self::send_json(request).await?;
        Ok(info.task_uid)
    }

    async fn add_documents(&self, index_uid: &str, documents: &[VideoRecord]) -> Result<TaskUid> {
        let request = self
            .request(Method::POST, &["indexes", index_uid, "documents"])?
            .query(&[("primaryKey", PRIMARY_KEY)])
            .json(documents);
        let info: TaskInfo = Self::send_json(request).await?;
        log::debug!(
            "Enqueued {} documents for '{}' as task {}",
            documents.len(),
            index_uid,
            info.task_uid
        );
        Ok(info.task_uid)
    }

    async fn task(&self, task_uid: TaskUid) -> Result<Task> {
        let uid = task_uid.to_string();
        Self::send_json(self.request(Method::GET, &["tasks", &uid])?).await
    }
}
