use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::extract::ApiJson;
use super::AppState;
use crate::generator::{build_payload, BulkKind, BulkResult, GeneratedTest, LlmPayload, PayloadMode};
use crate::parser::{find_endpoint, list_endpoints, OpenApiDocument};

pub const MAX_REQUIREMENTS_CHARS: usize = 20_000;
pub const MAX_BULK_COUNT: usize = 50;
pub const DEFAULT_BULK_COUNT: usize = 15;

fn default_method() -> String {
    "GET".to_string()
}

fn default_count() -> usize {
    DEFAULT_BULK_COUNT
}

#[derive(Debug, Deserialize)]
pub struct ManualTestRequest {
    pub requirements: String,
}

#[derive(Debug, Deserialize)]
pub struct UiE2eRequest {
    pub requirements: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTestRequest {
    pub openapi: String,
    pub endpoint_path: String,
    #[serde(default = "default_method")]
    pub method: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkManualTestRequest {
    pub requirements: String,
    #[serde(default = "default_count")]
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct BulkApiTestRequest {
    pub openapi: String,
    pub endpoint_path: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn check_requirements(requirements: &str) -> Result<(), ApiError> {
    let len = requirements.chars().count();
    if len == 0 || len > MAX_REQUIREMENTS_CHARS {
        return Err(ApiError::Validation(format!(
            "requirements must be between 1 and {MAX_REQUIREMENTS_CHARS} characters, got {len}"
        )));
    }
    Ok(())
}

fn check_count(count: usize) -> Result<(), ApiError> {
    if count == 0 || count > MAX_BULK_COUNT {
        return Err(ApiError::Validation(format!(
            "count must be between 1 and {MAX_BULK_COUNT}, got {count}"
        )));
    }
    Ok(())
}

/// Parse `openapi`, locate (`path`, `method`) and assemble its prompt payload.
fn endpoint_payload(
    openapi: &str,
    path: &str,
    method: &str,
    mode: PayloadMode,
    context: &'static str,
) -> Result<LlmPayload, ApiError> {
    let document =
        OpenApiDocument::parse(openapi).map_err(|source| ApiError::Document { context, source })?;
    let endpoints = list_endpoints(&document);
    tracing::debug!(endpoints = endpoints.len(), "document parsed");

    let endpoint = find_endpoint(&endpoints, path, method).ok_or_else(|| ApiError::EndpointNotFound {
        method: method.to_uppercase(),
        path: path.to_string(),
    })?;

    build_payload(&document, endpoint, mode).map_err(|source| ApiError::Document { context, source })
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[tracing::instrument(skip_all)]
pub async fn manual_test(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ManualTestRequest>,
) -> Result<Json<GeneratedTest>, ApiError> {
    check_requirements(&req.requirements)?;

    let generated = state
        .generator
        .manual_test(&req.requirements)
        .await
        .map_err(|source| ApiError::Generation {
            context: "Model error",
            source,
        })?;

    Ok(Json(generated))
}

#[tracing::instrument(skip_all)]
pub async fn ui_e2e_test(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UiE2eRequest>,
) -> Result<Json<GeneratedTest>, ApiError> {
    let generated = state
        .generator
        .ui_e2e_test(&req.requirements)
        .await
        .map_err(|source| ApiError::Generation {
            context: "e2e test generation failed",
            source,
        })?;

    Ok(Json(generated))
}

#[tracing::instrument(skip_all, fields(path = %req.endpoint_path, method = %req.method))]
pub async fn api_test(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ApiTestRequest>,
) -> Result<Json<GeneratedTest>, ApiError> {
    const CONTEXT: &str = "API test generation failed";

    let payload = endpoint_payload(
        &req.openapi,
        &req.endpoint_path,
        &req.method,
        PayloadMode::Auto,
        CONTEXT,
    )?;

    let generated = state
        .generator
        .api_test(&payload)
        .await
        .map_err(|source| ApiError::Generation {
            context: CONTEXT,
            source,
        })?;

    Ok(Json(generated))
}

#[tracing::instrument(skip_all, fields(path = %req.endpoint_path, method = %req.method))]
pub async fn api_manual_test(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ApiTestRequest>,
) -> Result<Json<GeneratedTest>, ApiError> {
    const CONTEXT: &str = "manual API test generation failed";

    let payload = endpoint_payload(
        &req.openapi,
        &req.endpoint_path,
        &req.method,
        PayloadMode::Manual,
        CONTEXT,
    )?;

    let generated = state
        .generator
        .api_manual_test(&payload)
        .await
        .map_err(|source| ApiError::Generation {
            context: CONTEXT,
            source,
        })?;

    Ok(Json(generated))
}

#[tracing::instrument(skip_all, fields(count = req.count))]
pub async fn bulk_manual_tests(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BulkManualTestRequest>,
) -> Result<Json<BulkResult>, ApiError> {
    check_requirements(&req.requirements)?;
    check_count(req.count)?;

    let result = state
        .generator
        .bulk(BulkKind::Manual(&req.requirements), req.count)
        .await;

    Ok(Json(result))
}

#[tracing::instrument(skip_all, fields(path = %req.endpoint_path, method = %req.method, count = req.count))]
pub async fn bulk_api_tests(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BulkApiTestRequest>,
) -> Result<Json<BulkResult>, ApiError> {
    check_count(req.count)?;

    let payload = endpoint_payload(
        &req.openapi,
        &req.endpoint_path,
        &req.method,
        PayloadMode::Auto,
        "bulk API test generation failed",
    )?;

    let result = state
        .generator
        .bulk(BulkKind::ApiTest(&payload), req.count)
        .await;

    Ok(Json(result))
}
