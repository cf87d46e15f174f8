use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::config::UpstreamConfig;

/// Incoming proxy body. Anything besides `model` and `messages` is forwarded untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Forwards chat-completion requests to the upstream with a server-side credential.
#[derive(Debug, Clone)]
pub struct ChatProxy {
    client: reqwest::Client,
    upstream: UpstreamConfig,
}

impl ChatProxy {
    pub fn new(client: reqwest::Client, upstream: UpstreamConfig) -> Self {
        Self { client, upstream }
    }

    pub async fn forward(&self, payload: ProxyRequest) -> Result<Value, ProxyError> {
        let started = Instant::now();

        let messages = match payload.messages {
            Some(Value::Array(items)) if !items.is_empty() => items,
            other => {
                warn!(provided = ?other, "proxy request missing messages");
                return Err(ProxyError::InvalidRequest(
                    "Missing required parameter: messages (array of message objects)".to_string(),
                ));
            }
        };

        let api_key = self.upstream.api_key.as_deref().ok_or_else(|| {
            error!("upstream API key not configured");
            ProxyError::MissingApiKey
        })?;

        let model = payload
            .model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.upstream.default_model.clone());

        let total_characters: usize = messages
            .iter()
            .filter_map(|message| message.get("content").and_then(Value::as_str))
            .map(|content| content.chars().count())
            .sum();
        info!(
            %model,
            message_count = messages.len(),
            total_characters,
            "forwarding chat completion upstream"
        );

        let mut body = payload.extra;
        body.insert("model".to_string(), Value::String(model));
        body.insert("messages".to_string(), Value::Array(messages));

        let response = self
            .client
            .post(self.upstream.completions_url())
            .bearer_auth(api_key)
            .timeout(self.upstream.timeout)
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));
            warn!(status = status.as_u16(), %details, "upstream returned error status");
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let result: Value = response
            .json()
            .await
            .map_err(|err| ProxyError::Internal(format!("invalid upstream response: {err}")))?;

        let returned_model = result.get("model").and_then(serde_json::Value::as_str);
        let choices = result
            .get("choices")
            .and_then(serde_json::Value::as_array)
            .map_or(0, Vec::len);
        info!(
            model = ?returned_model,
            choices,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "upstream chat completion succeeded"
        );

        Ok(result)
    }
}

fn classify_send_error(err: reqwest::Error) -> ProxyError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        ProxyError::NoResponse(err.to_string())
    } else {
        ProxyError::Internal(err.to_string())
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Server configuration error: Lkeap API key not set")]
    MissingApiKey,
    #[error("Lkeap API request failed with status {status}")]
    Upstream { status: u16, details: Value },
    #[error("No response from Lkeap API: {0}")]
    NoResponse(String),
    #[error("Internal server error while calling Lkeap API: {0}")]
    Internal(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ProxyError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ProxyError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": ProxyError::MissingApiKey.to_string() }),
            ),
            ProxyError::Upstream { status, details } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({
                    "error": "Lkeap API request failed",
                    "status": status,
                    "details": details,
                    "timestamp": timestamp(),
                }),
            ),
            ProxyError::NoResponse(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": "No response from Lkeap API",
                    "details": format!("Network error: {message}"),
                    "timestamp": timestamp(),
                }),
            ),
            ProxyError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Internal server error while calling Lkeap API",
                    "details": message,
                    "timestamp": timestamp(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
