//! HTTP API command handler.
//!
//! Endpoints:
//!
//! | Method | Path      | Description                              |
//! |--------|-----------|------------------------------------------|
//! | `POST` | `/query`  | Resolve a query, returns a QueryResponse |
//! | `GET`  | `/health` | Health check                             |
//!
//! Every response carries an `x-request-id` header (incoming
//! `X-Request-ID`/`X-Correlation-ID`/`X-Trace-ID`, or generated). CORS is
//! fully permissive to support browser clients.

use axum::{
    extract::State,
    http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Args;
use duplodocs_assistant::Assistant;
use duplodocs_core::{AppConfig, AppResult};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Bind host (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig, assistant: Arc<Assistant>) -> AppResult<()> {
        let host = self.host.clone().unwrap_or_else(|| config.server.host.clone());
        let port = self.port.unwrap_or(config.server.port);

        let app = Router::new()
            .route("/query", post(handle_query))
            .route("/health", get(handle_health))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(assistant);

        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn handle_query(
    State(assistant): State<Arc<Assistant>>,
    headers: HeaderMap,
    Json(request): Json<QueryRequest>,
) -> Response {
    let request_id = request_id_from(&headers);

    if request.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "query must not be empty" })),
        )
            .into_response();
    }

    let start = Instant::now();
    tracing::info!("Processing request {}: {}", request_id, request.query);

    let response = assistant.resolve(&request.query).await;

    tracing::info!(
        "Request {} completed in {:.2}s (confidence: {:.2}, internet: {}, sources: {})",
        request_id,
        start.elapsed().as_secs_f64(),
        response.confidence_score,
        response.used_internet_search,
        response.sources.len()
    );

    let mut http_response = Json(response).into_response();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        http_response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }
    http_response
}

async fn handle_health() -> Response {
    Json(json!({ "status": "healthy" })).into_response()
}

/// Take the caller-supplied request id, or generate a short one.
fn request_id_from(headers: &HeaderMap) -> String {
    for name in ["x-request-id", "x-correlation-id", "x-trace-id"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
