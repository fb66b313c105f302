use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, Level};

use crate::api::models::fetch_models;
use crate::api::{ChatRequest, ChatResponse, ModelList};
use crate::core::config::Config;
use crate::utils::url::endpoint_url;

pub const CHAT_COMPLETIONS_ENDPOINT: &str = "v1/chat/completions";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {summary}")]
    Status {
        status: reqwest::StatusCode,
        summary: String,
        body: String,
    },

    #[error("Failed to decode response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

/// Sends one completion request and waits for the full reply.
///
/// Implementations must not retry; the tool loop treats every error as
/// terminal.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// Plain JSON-over-HTTP transport for OpenAI-compatible servers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, config.base_url()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_models(&self) -> Result<ModelList, TransportError> {
        fetch_models(&self.client, &self.base_url).await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let chat_url = endpoint_url(&self.base_url, CHAT_COMPLETIONS_ENDPOINT);
        if tracing::enabled!(Level::DEBUG) {
            if let Ok(body) = serde_json::to_string_pretty(request) {
                debug!(url = %chat_url, "Request\n{body}");
            }
        }

        let response = self
            .client
            .post(chat_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        read_json(response).await
    }
}

/// Read a response body, failing on non-success statuses and undecodable
/// payloads. The raw body is kept on both errors for diagnostics.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TransportError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(TransportError::Status {
            status,
            summary: summarize_api_error(&body),
            body,
        });
    }

    debug!(%status, "Response\n{body}");
    serde_json::from_str(&body).map_err(|source| TransportError::Decode { source, body })
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// One-line description of an error body: the API's own message when the
/// body is a JSON error envelope, otherwise the trimmed body text.
pub(crate) fn summarize_api_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .filter(|summary| !summary.is_empty())
        .unwrap_or_else(|| trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
}
