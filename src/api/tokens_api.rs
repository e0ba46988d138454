use axum::{
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::database::TokenRepository;
use crate::token_sync::TokenSyncService;

use super::response::ApiResponse;

#[derive(Clone)]
pub struct TokensApiState {
    pub repository: Arc<TokenRepository>,
    pub sync_service: Arc<TokenSyncService>,
    pub network: String,
    pub cache_miss_timeout: Duration,
    /// Surface error details in responses (development only).
    pub expose_errors: bool,
}

pub fn create_tokens_router() -> Router<TokensApiState> {
    Router::new().route("/:network/tokens", get(get_tokens))
}

/// Serves the persisted top-token set. An empty store is a cache miss: one
/// refresh cycle runs synchronously (bounded) before the re-read. A failed
/// refresh degrades to serving whatever the store holds.
async fn get_tokens(
    State(state): State<TokensApiState>,
    Path(network): Path<String>,
) -> Response {
    if network != state.network {
        return ApiResponse::error(
            StatusCode::NOT_FOUND,
            format!("Network {} is not supported", network),
        )
        .into_response();
    }

    let tokens = match state.repository.get_top_tokens(&state.network).await {
        Ok(tokens) => tokens,
        Err(e) => return read_failure(&state, e),
    };
    if !tokens.is_empty() {
        return ApiResponse::success(tokens).into_response();
    }

    info!("Token cache empty for {}, triggering refresh", state.network);
    match timeout(state.cache_miss_timeout, state.sync_service.refresh()).await {
        Ok(Ok(saved)) => info!("Cache-miss refresh completed: {} tokens saved", saved),
        Ok(Err(e)) => warn!("Cache-miss refresh failed, serving stored data: {}", e),
        Err(_) => warn!(
            "Cache-miss refresh timed out after {}s",
            state.cache_miss_timeout.as_secs()
        ),
    }

    match state.repository.get_top_tokens(&state.network).await {
        Ok(tokens) => ApiResponse::success(tokens).into_response(),
        Err(e) => read_failure(&state, e),
    }
}

fn read_failure(state: &TokensApiState, e: anyhow::Error) -> Response {
    error!("Failed to read tokens for {}: {:#}", state.network, e);
    let message = if state.expose_errors {
        format!("{:#}", e)
    } else {
        "Internal server error".to_string()
    };
    ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}

pub async fn handle_not_found(method: Method, uri: Uri) -> Response {
    ApiResponse::error(
        StatusCode::NOT_FOUND,
        format!("Route {} {} not found", method, uri.path()),
    )
    .into_response()
}

pub async fn health_check() -> &'static str {
    "OK"
}
