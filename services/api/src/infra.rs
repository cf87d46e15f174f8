use mbti_insight::config::{AnalysisConfig, AppEnvironment, ProviderKind};
use mbti_insight::error::AppError;
use mbti_insight::workflows::analysis::AnalysisPipeline;
use mbti_insight::workflows::questionnaire::QuestionCatalog;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) started_at: Instant,
    pub(crate) environment: AppEnvironment,
    pub(crate) catalog: Arc<QuestionCatalog>,
    pub(crate) pipeline: Arc<AnalysisPipeline>,
}

const USER_AGENT: &str = concat!("mbti-insight/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for the analysis provider and the chat proxy.
pub(crate) fn http_client() -> Result<reqwest::Client, AppError> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    Ok(client)
}

/// Builds the analysis pipeline, forcing canned output when `offline` is set.
pub(crate) fn analysis_pipeline(
    config: &AnalysisConfig,
    offline: bool,
) -> Result<AnalysisPipeline, AppError> {
    let mut config = config.clone();
    if offline {
        config.provider = ProviderKind::Canned;
    }
    Ok(AnalysisPipeline::from_config(&config, http_client()?))
}
