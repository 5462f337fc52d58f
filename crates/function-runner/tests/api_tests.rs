//! Integration tests for the runner API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use function_lib::{BaselineEngine, FunctionRegistry, Pipeline, PipelineConfig};
use function_runner::api::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn setup_test_app(stages: Value) -> (Router, Arc<AppState>) {
    let registry = Arc::new(FunctionRegistry::with_builtins());
    let config: PipelineConfig = serde_json::from_value(json!({ "stages": stages })).unwrap();
    let pipeline =
        Pipeline::from_config("test", &registry, &config, Arc::new(BaselineEngine)).unwrap();

    let state = Arc::new(AppState::new(registry, Arc::new(pipeline)));
    let router = create_router(state.clone());

    (router, state)
}

fn scale_stage() -> Value {
    json!([{
        "function": "MultiplyByFactor",
        "args": {"input_items": ["temp"], "factor": 2.5, "output_items": ["temp_scaled"]}
    }])
}

fn batch_body(columns: Value) -> Body {
    let index: Vec<Value> = (0..2)
        .map(|i| {
            json!({
                "entity_id": "pump-1",
                "timestamp": format!("2024-01-01T00:0{}:00Z", i),
            })
        })
        .collect();
    Body::from(json!({ "index": index, "columns": columns }).to_string())
}

fn post_execute(body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/execute")
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_healthz_reports_stage_count() {
    let (app, _state) = setup_test_app(scale_stage());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["stages"], 1);
}

#[tokio::test]
async fn test_readyz_follows_ready_flag() {
    let (app, state) = setup_test_app(json!([]));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    state.set_ready(true);
    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ready"], true);
}

#[tokio::test]
async fn test_execute_runs_pipeline() {
    let (app, _state) = setup_test_app(scale_stage());

    let response = app
        .oneshot(post_execute(batch_body(json!([
            {"name": "temp", "values": {"float": [10.0, 20.0]}}
        ]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let batch = body_json(response).await;
    let columns = batch["columns"].as_array().unwrap();
    let scaled = columns
        .iter()
        .find(|c| c["name"] == "temp_scaled")
        .unwrap();
    assert_eq!(scaled["values"]["float"], json!([25.0, 50.0]));
}

#[tokio::test]
async fn test_execute_missing_column_is_unprocessable() {
    let (app, _state) = setup_test_app(scale_stage());

    let response = app
        .oneshot(post_execute(batch_body(json!([]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("temp"));
}

#[tokio::test]
async fn test_execute_rejects_ragged_columns() {
    let (app, _state) = setup_test_app(scale_stage());

    let response = app
        .oneshot(post_execute(batch_body(json!([
            {"name": "temp", "values": {"float": [10.0]}}
        ]))))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_functions_lists_catalog() {
    let (app, _state) = setup_test_app(json!([]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/functions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let catalog = body_json(response).await;
    let names: Vec<&str> = catalog
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"SimpleAnomaly"));
    assert!(names.contains(&"MultiplyByFactor"));
}

#[tokio::test]
async fn test_function_ui_and_unknown_function() {
    let (app, _state) = setup_test_app(json!([]));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/functions/SimpleAnomaly/ui")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ui = body_json(response).await;
    assert!(ui["inputs"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["name"] == "threshold"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/functions/Nope/ui")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, _state) = setup_test_app(scale_stage());

    // Run one batch so the stage metrics have samples
    let response = app
        .clone()
        .oneshot(post_execute(batch_body(json!([
            {"name": "temp", "values": {"float": [1.0, 2.0]}}
        ]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("iot_function_execution_latency_seconds_bucket"));
    assert!(metrics_text.contains("iot_function_rows_processed_total"));
    assert!(metrics_text.contains("iot_function_pipeline_stages"));
}

#[tokio::test]
async fn test_pipeline_describes_stages() {
    let (app, _state) = setup_test_app(scale_stage());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/pipeline")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let stages = body_json(response).await;
    assert_eq!(stages[0]["function"], "MultiplyByFactor");
    assert_eq!(stages[0]["produces"], json!(["temp_scaled"]));
}
