//! HTTP API for pipeline execution, the function catalog and Prometheus metrics

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use function_lib::{
    Batch, CatalogEntry, FunctionError, FunctionRegistry, Pipeline, StageInfo,
    UiSchema,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

const RUNNER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared application state
pub struct AppState {
    pub registry: Arc<FunctionRegistry>,
    pub pipeline: Arc<Pipeline>,
    ready: AtomicBool,
}

impl AppState {
    pub fn new(registry: Arc<FunctionRegistry>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            registry,
            pipeline,
            ready: AtomicBool::new(false),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Error body returned by every failing endpoint
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<FunctionError> for ApiError {
    fn from(err: FunctionError) -> Self {
        let status = match err {
            FunctionError::UnknownFunction(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": RUNNER_VERSION,
        "stages": state.pipeline.len(),
    }))
}

/// Readiness check - 200 once the pipeline is loaded, 503 before
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ready = state.is_ready();
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(json!({ "ready": ready })))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn list_functions(State(state): State<Arc<AppState>>) -> Json<Vec<CatalogEntry>> {
    Json(state.registry.catalog())
}

async fn function_ui(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<UiSchema>, ApiError> {
    Ok(Json(state.registry.ui(&name)?))
}

async fn pipeline_stages(State(state): State<Arc<AppState>>) -> Json<Vec<StageInfo>> {
    Json(state.pipeline.describe())
}

/// Run the loaded pipeline over one batch
async fn execute(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<Batch>,
) -> Result<Json<Batch>, ApiError> {
    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.execute(batch))
        .await
        .map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        })?;

    Ok(Json(result?))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/functions", get(list_functions))
        .route("/functions/:name/ui", get(function_ui))
        .route("/pipeline", get(pipeline_stages))
        .route("/execute", post(execute))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
