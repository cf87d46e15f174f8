use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{AnalysisError, RemoteErrorKind};
use super::fallback::{CannedAnalysisProvider, REJECTION_TEXT, UNAVAILABLE_NOTICE};
use super::provider::{AnalysisProvider, GeneratedAnalysis, ProxyAnalysisProvider};
use super::request::{AnalysisProfile, AnalysisRequest};
use crate::config::{AnalysisConfig, ProviderKind};
use crate::workflows::questionnaire::{MbtiResult, PersonalityType};

/// Where the text of an outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOrigin {
    Remote,
    Fallback,
    Rejected,
}

/// Error that pushed an outcome onto the fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackReason {
    pub kind: RemoteErrorKind,
    pub message: String,
}

/// Final result of one `analyze` call. Always renderable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    pub result_code: MbtiResult,
    pub origin: AnalysisOrigin,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FallbackReason>,
}

impl AnalysisOutcome {
    fn rejected() -> Self {
        Self {
            result_code: MbtiResult::Unknown,
            origin: AnalysisOrigin::Rejected,
            text: REJECTION_TEXT.to_string(),
            model: None,
            error: None,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.origin == AnalysisOrigin::Remote
    }

    /// User-facing text. Fallback content is prefixed with the service-unavailable notice so
    /// it is never mistaken for a live analysis.
    pub fn render(&self) -> String {
        match (&self.origin, &self.error) {
            (AnalysisOrigin::Fallback, Some(reason)) => format!(
                "{UNAVAILABLE_NOTICE}：{}\n模拟分析结果：\n{}",
                reason.message, self.text
            ),
            (AnalysisOrigin::Fallback, None) => {
                format!("{UNAVAILABLE_NOTICE}（离线模式）\n模拟分析结果：\n{}", self.text)
            }
            _ => self.text.clone(),
        }
    }
}

/// Bounded retry for transient failures. `max_retries == 0` means a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn single_attempt() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(retry)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

/// Per-call knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub profile: AnalysisProfile,
}

/// Runs the primary provider under a one-shot timeout and substitutes canned content for
/// any failure.
pub struct AnalysisPipeline {
    primary: Arc<dyn AnalysisProvider>,
    fallback: CannedAnalysisProvider,
    default_model: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl AnalysisPipeline {
    pub fn new(
        primary: Arc<dyn AnalysisProvider>,
        default_model: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            primary,
            fallback: CannedAnalysisProvider,
            default_model: default_model.into(),
            timeout,
            retry,
        }
    }

    pub fn from_config(config: &AnalysisConfig, client: reqwest::Client) -> Self {
        let primary: Arc<dyn AnalysisProvider> = match config.provider {
            ProviderKind::Remote => {
                Arc::new(ProxyAnalysisProvider::new(client, config.proxy_url.clone()))
            }
            ProviderKind::Canned => Arc::new(CannedAnalysisProvider),
        };

        Self::new(
            primary,
            config.default_model.clone(),
            config.timeout,
            RetryPolicy {
                max_retries: config.max_retries,
                backoff: config.retry_backoff,
            },
        )
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn analyze(&self, result: MbtiResult) -> AnalysisOutcome {
        self.analyze_with(result, AnalysisOptions::default()).await
    }

    pub async fn analyze_with(&self, result: MbtiResult, options: AnalysisOptions) -> AnalysisOutcome {
        let Some(kind) = result.personality_type() else {
            info!("analysis rejected for unknown result");
            return AnalysisOutcome::rejected();
        };

        let model = options
            .model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.default_model.clone());
        let request = AnalysisRequest::new(kind, model, options.profile);

        info!(
            code = %kind,
            model = %request.model,
            provider = self.primary.name(),
            timeout_ms = self.timeout.as_millis() as u64,
            "dispatching analysis request"
        );

        let started = Instant::now();
        let attempt = tokio::time::timeout(self.timeout, self.attempt(&request)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match attempt {
            Ok(Ok(generated)) => {
                info!(code = %kind, elapsed_ms, model = ?generated.model, "analysis succeeded");
                self.completed(kind, generated)
            }
            Ok(Err(error)) => self.fall_back(&request, error, elapsed_ms),
            Err(_) => self.fall_back(&request, AnalysisError::Timeout(self.timeout), elapsed_ms),
        }
    }

    async fn attempt(&self, request: &AnalysisRequest) -> Result<GeneratedAnalysis, AnalysisError> {
        let mut retries = 0;
        loop {
            match self.primary.generate(request).await {
                Ok(generated) => return Ok(generated),
                Err(error) if retries < self.retry.max_retries && error.is_transient() => {
                    retries += 1;
                    warn!(retry = retries, %error, "retrying analysis request");
                    tokio::time::sleep(self.retry.delay_for(retries)).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn completed(&self, kind: PersonalityType, generated: GeneratedAnalysis) -> AnalysisOutcome {
        AnalysisOutcome {
            result_code: MbtiResult::Type(kind),
            origin: self.primary.origin(),
            text: generated.text,
            model: generated.model,
            error: None,
        }
    }

    fn fall_back(
        &self,
        request: &AnalysisRequest,
        error: AnalysisError,
        elapsed_ms: u64,
    ) -> AnalysisOutcome {
        warn!(
            code = %request.personality_type,
            kind = ?error.kind(),
            %error,
            elapsed_ms,
            "analysis failed, serving fallback"
        );

        AnalysisOutcome {
            result_code: MbtiResult::Type(request.personality_type),
            origin: AnalysisOrigin::Fallback,
            text: self.fallback.analysis_for(request),
            model: None,
            error: Some(FallbackReason {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }
}
