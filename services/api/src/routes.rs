use crate::infra::AppState;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{SecondsFormat, Utc};
use mbti_insight::error::AppError;
use mbti_insight::workflows::analysis::{AnalysisOptions, AnalysisOutcome, AnalysisProfile};
use mbti_insight::workflows::proxy::{chat_proxy_router, ChatProxy};
use mbti_insight::workflows::questionnaire::{
    score_detailed, Answer, MbtiResult, Question, SessionError, TallyEntry, Variant,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Serialize)]
pub(crate) struct VariantSummary {
    pub(crate) variant: Variant,
    pub(crate) label: &'static str,
    pub(crate) question_count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionnaireResponse {
    pub(crate) variant: Variant,
    pub(crate) label: &'static str,
    pub(crate) questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) variant: Variant,
    #[serde(default)]
    pub(crate) answers: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) variant: Variant,
    pub(crate) result: MbtiResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tally: Option<Vec<TallyEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalysisBody {
    pub(crate) result_code: MbtiResult,
    #[serde(default)]
    pub(crate) model: Option<String>,
    #[serde(default)]
    pub(crate) long_context: bool,
}

pub(crate) fn service_router(proxy: Arc<ChatProxy>) -> Router {
    chat_proxy_router(proxy)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/api/v1/questionnaire", get(list_variants))
        .route("/api/v1/questionnaire/score", post(score_endpoint))
        .route("/api/v1/questionnaire/:variant", get(questionnaire_endpoint))
        .route("/api/v1/analysis", post(analysis_endpoint))
}

pub(crate) async fn healthcheck(Extension(state): Extension<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "processId": std::process::id(),
        "environment": state.environment.label(),
    }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn list_variants(
    Extension(state): Extension<AppState>,
) -> Json<Vec<VariantSummary>> {
    Json(
        state
            .catalog
            .variants()
            .map(|(variant, question_count)| VariantSummary {
                variant,
                label: variant.label(),
                question_count,
            })
            .collect(),
    )
}

pub(crate) async fn questionnaire_endpoint(
    Extension(state): Extension<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<QuestionnaireResponse>, AppError> {
    let variant = Variant::parse(&raw).ok_or_else(|| {
        AppError::NotFound(format!("questionnaire variant '{raw}' does not exist"))
    })?;
    let questions = state
        .catalog
        .questions(variant)
        .ok_or(SessionError::VariantUnavailable(variant))?;

    Ok(Json(QuestionnaireResponse {
        variant,
        label: variant.label(),
        questions: questions.to_vec(),
    }))
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let ScoreRequest { variant, answers } = payload;
    let questions = state
        .catalog
        .questions(variant)
        .ok_or(SessionError::VariantUnavailable(variant))?;

    let Some(answers) = decode_answers(answers) else {
        warn!(%variant, "score request carried no usable answer sequence");
        return Ok(Json(ScoreResponse {
            variant,
            result: MbtiResult::Unknown,
            tally: None,
        }));
    };

    let (result, tally) = score_detailed(&answers, questions);

    Ok(Json(ScoreResponse {
        variant,
        result,
        tally: tally.map(|tally| tally.entries()),
    }))
}

/// Reads submitted answers leniently. Only an array of integers and nulls can be scored.
fn decode_answers(raw: Option<Value>) -> Option<Vec<Answer>> {
    let Some(Value::Array(items)) = raw else {
        return None;
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Null => Some(None),
            Value::Number(number) => number
                .as_i64()
                .and_then(|value| i32::try_from(value).ok())
                .map(Some),
            _ => None,
        })
        .collect()
}

pub(crate) async fn analysis_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AnalysisBody>,
) -> Json<AnalysisOutcome> {
    let options = AnalysisOptions {
        model: payload.model,
        profile: if payload.long_context {
            AnalysisProfile::LongContext
        } else {
            AnalysisProfile::Detailed
        },
    };

    Json(
        state
            .pipeline
            .analyze_with(payload.result_code, options)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use mbti_insight::config::UpstreamConfig;
    use mbti_insight::workflows::analysis::{
        canned_analysis, AnalysisOrigin, AnalysisPipeline, CannedAnalysisProvider, RetryPolicy,
        REJECTION_TEXT,
    };
    use mbti_insight::workflows::questionnaire::QuestionCatalog;
    use std::sync::atomic::AtomicBool;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;

    fn test_state(ready: bool) -> AppState {
        let pipeline = AnalysisPipeline::new(
            Arc::new(CannedAnalysisProvider),
            "deepseek-v3-0324",
            Duration::from_secs(1),
            RetryPolicy::default(),
        );
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            started_at: Instant::now(),
            environment: mbti_insight::config::AppEnvironment::Test,
            catalog: Arc::new(QuestionCatalog::builtin().expect("builtin catalog")),
            pipeline: Arc::new(pipeline),
        }
    }

    fn test_router() -> Router {
        let upstream = UpstreamConfig {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            api_key: None,
            default_model: "deepseek-v3-0324".to_string(),
            timeout: Duration::from_secs(1),
        };
        let proxy = Arc::new(ChatProxy::new(reqwest::Client::new(), upstream));
        service_router(proxy).layer(Extension(test_state(true)))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn healthcheck_reports_process_details() {
        let Json(body) = healthcheck(Extension(test_state(true))).await;

        assert_eq!(body["status"], "OK");
        assert_eq!(body["environment"], "test");
        assert_eq!(body["processId"], std::process::id());
        assert!(body["uptime"].as_f64().expect("uptime") >= 0.0);
        assert!(body["timestamp"].as_str().expect("timestamp").ends_with('Z'));
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = readiness_endpoint(Extension(test_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(test_state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn questionnaire_lists_short_questions() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/questionnaire/short")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["variant"], "short");
        assert_eq!(body["questions"].as_array().expect("questions").len(), 8);
        assert_eq!(body["questions"][0]["dimension"], "E/I");
    }

    #[tokio::test]
    async fn unknown_questionnaire_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/questionnaire/marathon")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn variants_are_listed_with_counts() {
        let Json(summaries) = list_variants(Extension(test_state(true))).await;

        let counts: Vec<(Variant, usize)> = summaries
            .iter()
            .map(|summary| (summary.variant, summary.question_count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (Variant::Short, 8),
                (Variant::Standard, 12),
                (Variant::Extended, 4)
            ]
        );
    }

    #[tokio::test]
    async fn score_endpoint_resolves_all_fives_to_enfp() {
        let request = ScoreRequest {
            variant: Variant::Short,
            answers: Some(json!([5, 5, 5, 5, 5, 5, 5, 5])),
        };

        let Json(body) = score_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect("scores");

        assert_eq!(body.result.to_string(), "ENFP");
        assert_eq!(body.tally.expect("tally present").len(), 4);
    }

    #[tokio::test]
    async fn score_endpoint_reports_unknown_for_mismatched_lengths() {
        let response = test_router()
            .oneshot(
                Request::post("/api/v1/questionnaire/score")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"variant":"short","answers":[5,5,5]}"#.to_string(),
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["result"], "unknown");
        assert!(body.get("tally").is_none());
    }

    async fn score_body(body: &'static str) -> Value {
        let response = test_router()
            .oneshot(
                Request::post("/api/v1/questionnaire/score")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK, "body {body}");
        body_json(response).await
    }

    #[tokio::test]
    async fn score_endpoint_fails_soft_on_unusable_answers() {
        for body in [
            r#"{"variant":"short"}"#,
            r#"{"variant":"short","answers":null}"#,
            r#"{"variant":"short","answers":"abc"}"#,
            r#"{"variant":"short","answers":{"0":5}}"#,
            r#"{"variant":"short","answers":[5,5,5,5,5,5,5,99999999999]}"#,
            r#"{"variant":"short","answers":[5,5,5,5,5,5,5,4.5]}"#,
            r#"{"variant":"short","answers":[5,5,5,5,5,5,5,"5"]}"#,
        ] {
            let value = score_body(body).await;
            assert_eq!(value["result"], "unknown", "body {body}");
            assert!(value.get("tally").is_none(), "body {body}");
        }
    }

    #[tokio::test]
    async fn score_endpoint_treats_nulls_as_unanswered() {
        let value =
            score_body(r#"{"variant":"short","answers":[null,null,null,null,null,null,null,null]}"#)
                .await;

        assert_eq!(value["result"], "INFP");
        assert_eq!(value["tally"].as_array().expect("tally").len(), 4);
    }

    #[test]
    fn decode_answers_accepts_integers_and_nulls_only() {
        assert_eq!(
            decode_answers(Some(json!([1, null, 5]))),
            Some(vec![Some(1), None, Some(5)])
        );
        assert_eq!(decode_answers(Some(json!([-3]))), Some(vec![Some(-3)]));
        assert_eq!(decode_answers(Some(json!([true]))), None);
        assert_eq!(decode_answers(None), None);
    }

    #[tokio::test]
    async fn analysis_endpoint_uses_configured_provider() {
        let body = AnalysisBody {
            result_code: MbtiResult::from_code("INTJ"),
            model: None,
            long_context: false,
        };

        let Json(outcome) = analysis_endpoint(Extension(test_state(true)), Json(body)).await;

        assert_eq!(outcome.origin, AnalysisOrigin::Fallback);
        assert_eq!(outcome.text, canned_analysis("INTJ"));
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn analysis_endpoint_rejects_unknown_codes() {
        let response = test_router()
            .oneshot(
                Request::post("/api/v1/analysis")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"result_code":"XYZW"}"#.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["origin"], "rejected");
        assert_eq!(body["text"], REJECTION_TEXT);
        assert_eq!(body["result_code"], "unknown");
    }

    #[tokio::test]
    async fn chat_proxy_is_mounted() {
        let response = test_router()
            .oneshot(
                Request::post("/api/lkeap")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"model":"deepseek-v3-0324"}"#.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
