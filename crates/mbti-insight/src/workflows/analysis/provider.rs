use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use tracing::debug;

use super::error::AnalysisError;
use super::pipeline::AnalysisOrigin;
use super::request::{AnalysisRequest, ChatCompletionResponse};

const CLIENT_USER_AGENT: &str = "MBTI-Test-App/1.0";

/// Text produced by a provider, plus the model that produced it when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAnalysis {
    pub text: String,
    pub model: Option<String>,
}

/// Something that can turn an analysis request into text.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Provenance reported on outcomes produced by this provider.
    fn origin(&self) -> AnalysisOrigin {
        AnalysisOrigin::Remote
    }

    async fn generate(&self, request: &AnalysisRequest) -> Result<GeneratedAnalysis, AnalysisError>;
}

/// Posts chat-completion requests to the same-origin proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxyAnalysisProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl ProxyAnalysisProvider {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisProvider for ProxyAnalysisProvider {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn generate(&self, request: &AnalysisRequest) -> Result<GeneratedAnalysis, AnalysisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&request.chat_body())
            .send()
            .await
            .map_err(|err| AnalysisError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AnalysisError::HttpStatus {
                status: status.as_u16(),
                details,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| AnalysisError::Network(err.to_string()))?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&body)
            .map_err(|err| AnalysisError::MalformedResponse(err.to_string()))?;

        debug!(
            choices = parsed.choices.len(),
            created = ?parsed.created,
            "proxy returned chat completion"
        );

        let text = parsed.first_content().ok_or_else(|| {
            AnalysisError::MalformedResponse("response carried no message content".to_string())
        })?;

        Ok(GeneratedAnalysis {
            text: text.to_string(),
            model: parsed.model.clone(),
        })
    }
}
