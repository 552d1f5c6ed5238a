//! HTTP transport over the request handlers in [`crate::app::api`].

use std::sync::Arc;

use axum::{Json, Router};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::app::AppContext;
use crate::app::api::{self, ApiResponse};
use crate::domain::AppError;

type SharedContext = Arc<AppContext>;

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct TextParams {
    prompt_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageParams {
    #[serde(default)]
    debug: bool,
}

pub fn router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/text", post(text))
        .route("/api/v1/text-media", post(text_media))
        .route("/api/v1/image-media", post(image_media))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Serve until Ctrl-C.
///
/// The runtime is owned here so the blocking HTTP clients inside `ctx` are
/// created and dropped outside of it.
pub fn serve(ctx: AppContext, host: &str, port: u16) -> Result<(), AppError> {
    let ctx = Arc::new(ctx);
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let result = runtime.block_on(listen(ctx.clone(), host, port));
    drop(runtime);
    result
}

async fn listen(ctx: SharedContext, host: &str, port: u16) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(address = %listener.local_addr()?, "mediaforge server listening");
    axum::serve(listener, router(ctx)).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

/// Pipelines block on HTTP calls, so they run on the blocking pool.
async fn blocking(work: impl FnOnce() -> ApiResponse + Send + 'static) -> ApiResponse {
    match tokio::task::spawn_blocking(work).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "request handler panicked");
            ApiResponse { status: 500, body: json!({ "success": false, "error": "INTERNAL", "message": e.to_string() }) }
        }
    }
}

fn parse_body(bytes: &Bytes) -> Result<Value, ApiResponse> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(api::invalid_body("expected an object")),
        Err(e) => Err(api::invalid_body(&e.to_string())),
    }
}

async fn health() -> ApiResponse {
    api::health()
}

async fn text(State(ctx): State<SharedContext>, Query(params): Query<TextParams>, body: Bytes) -> ApiResponse {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    blocking(move || api::text(&ctx, params.prompt_name.as_deref(), &body)).await
}

async fn text_media(State(ctx): State<SharedContext>, body: Bytes) -> ApiResponse {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    blocking(move || api::text_media(&ctx, &body)).await
}

async fn image_media(State(ctx): State<SharedContext>, Query(params): Query<ImageParams>, body: Bytes) -> ApiResponse {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    blocking(move || api::image_media(&ctx, &body, params.debug)).await
}

async fn not_found(uri: Uri) -> ApiResponse {
    api::not_found(uri.path())
}
