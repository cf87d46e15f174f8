use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};

use super::forward::{ChatProxy, ProxyRequest};

pub const PROXY_PATH: &str = "/api/lkeap";

/// Router exposing the same-origin chat-completion proxy.
pub fn chat_proxy_router(proxy: Arc<ChatProxy>) -> Router {
    Router::new()
        .route(PROXY_PATH, post(proxy_handler))
        .with_state(proxy)
}

pub(crate) async fn proxy_handler(
    State(proxy): State<Arc<ChatProxy>>,
    Json(payload): Json<ProxyRequest>,
) -> impl IntoResponse {
    proxy.forward(payload).await.map(Json)
}
