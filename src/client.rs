use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a backend call. `Display` is the description shown to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status {status}{}", detail_suffix(.detail))]
    Status {
        status: reqwest::StatusCode,
        detail: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request task ended unexpectedly: {0}")]
    Task(String),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    answer: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

/// Client for the transcript backend's `/upload` and `/chat` endpoints
#[derive(Clone)]
pub struct TranscriptClient {
    client: Client,
    base_url: String,
}

impl TranscriptClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one transcript file as the multipart field `file`.
    /// Returns the backend's `message`.
    pub async fn upload(&self, path: &Path) -> Result<String, ApiError> {
        let url = format!("{}/upload", self.base_url);

        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "transcript".to_string());

        tracing::info!(%url, file = %file_name, bytes = bytes.len(), "uploading transcript");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let response = self.client.post(&url).multipart(form).send().await?;

        let body: UploadResponse = read_json(response).await?;
        Ok(body.message)
    }

    /// Ask one question. Returns the backend's `answer`.
    pub async fn chat(&self, question: &str) -> Result<String, ApiError> {
        let url = format!("{}/chat", self.base_url);
        tracing::info!(%url, chars = question.chars().count(), "sending question");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { question })
            .send()
            .await?;

        let body: ChatResponse = read_json(response).await?;
        Ok(body.answer)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            detail: error_detail(&text),
        });
    }

    Ok(serde_json::from_str(&text)?)
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Pull the `detail` out of a FastAPI-style error body
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
