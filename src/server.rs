use crate::config::{ProxyConfig, ProxyMode};
use crate::error::{FailureBody, ProxyError, Result};
use crate::logging::SharedLogger;
use crate::proxy::{self, RelayOutcome};
use crate::upstream::Upstream;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const PROXY_VERSION_HEADER: &str = "x-proxy-version";
pub const PROXY_VERSION: &str = "translate-legacy-1";

#[derive(Clone)]
pub struct AppState {
    pub config: ProxyConfig,
    pub upstream: Upstream,
    pub logger: SharedLogger,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let proxy_routes = Router::new()
        .route("/api/openai", any(handle_proxy))
        .route("/v1/responses", any(handle_proxy))
        .layer(middleware::from_fn_with_state(state.clone(), cors_headers));

    Router::new()
        .merge(proxy_routes)
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The method is checked before any of the body is read, so preflights and
/// rejected methods never hit the body limit.
async fn handle_proxy(State(state): State<Arc<AppState>>, req: Request) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    if req.method() != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(FailureBody::method_not_allowed()),
        )
            .into_response();
    }

    let result = match read_body(req.into_body(), state.config.max_body_bytes).await {
        Ok(raw) => proxy::relay(&raw, state.config.mode, &state.upstream, &state.logger).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => {
            state.logger.error("server", format!("Proxy failed: {}", e));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(e.failure_body())).into_response()
        }
    }
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ProxyError::invalid_body(format!("Failed to read request body: {}", e)))
}

fn outcome_response(outcome: RelayOutcome) -> Response {
    let status = StatusCode::from_u16(outcome.status()).unwrap_or(StatusCode::BAD_GATEWAY);

    match outcome {
        RelayOutcome::Raw(reply) => {
            let content_type = reply
                .content_type
                .unwrap_or_else(|| "application/json".to_string());

            Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(reply.body))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        RelayOutcome::Legacy { body, .. } => (status, Json(body)).into_response(),
    }
}

/// Stamp CORS headers (and the version header in translate mode) on every
/// proxy response, including preflights and errors.
async fn cors_headers(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    if state.config.mode == ProxyMode::Translate {
        headers.insert(PROXY_VERSION_HEADER, HeaderValue::from_static(PROXY_VERSION));
    }

    response
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": state.config.mode.as_str(),
    }))
}
