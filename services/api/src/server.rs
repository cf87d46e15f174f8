use crate::cli::ServeArgs;
use crate::infra::{analysis_pipeline, http_client, AppState};
use crate::routes::service_router;
use axum::Extension;
use mbti_insight::config::AppConfig;
use mbti_insight::error::AppError;
use mbti_insight::telemetry;
use mbti_insight::workflows::proxy::ChatProxy;
use mbti_insight::workflows::questionnaire::QuestionCatalog;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let started_at = Instant::now();
    let mut config = AppConfig::load()?;
    config.override_server(args.host, args.port);

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(QuestionCatalog::load(config.catalog_path.as_deref())?);
    let pipeline = Arc::new(analysis_pipeline(&config.analysis, false)?);
    let proxy = Arc::new(ChatProxy::new(http_client()?, config.upstream.clone()));

    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        started_at,
        environment: config.environment,
        catalog,
        pipeline,
    };

    let app = service_router(proxy)
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        proxy_url = %config.analysis.proxy_url,
        upstream = %config.upstream.base_url,
        api_key_configured = config.upstream.api_key.is_some(),
        "mbti insight service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
