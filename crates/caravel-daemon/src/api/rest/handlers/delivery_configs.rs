//! Delivery config handlers

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, State},
    Json,
};
use caravel_types::{DeliveryConfig, EnvironmentDiff};
use serde::Serialize;

/// Register or update a delivery config manifest.
///
/// If `name` matches an existing config this is an update, otherwise a new
/// config is created. Either way the declared resources come under
/// management immediately.
pub async fn upsert_delivery_config(
    State(state): State<AppState>,
    Json(config): Json<DeliveryConfig>,
) -> ApiResult<Json<DeliveryConfig>> {
    let stored = state.manifests.upsert(config).await?;

    // Newly declared resources should not wait a full interval
    state.scheduler.trigger_check_cycle().await;

    Ok(Json(stored))
}

/// Fetch a delivery config by name
pub async fn get_delivery_config(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<DeliveryConfig>> {
    let config = state.manifests.get(&name).await?;
    Ok(Json(config))
}

/// Delete a delivery config, returning the manifest as it was immediately
/// before deletion
pub async fn delete_delivery_config(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<DeliveryConfig>> {
    let deleted = state.manifests.delete(&name).await?;
    Ok(Json(deleted))
}

/// Compute environment diffs for an unsaved manifest
pub async fn diff_delivery_config(
    State(state): State<AppState>,
    Json(config): Json<DeliveryConfig>,
) -> ApiResult<Json<Vec<EnvironmentDiff>>> {
    let diffs = state.manifests.diff(&config).await?;
    Ok(Json(diffs))
}

/// Validation response marker
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub status: String,
}

/// Structurally validate a manifest without storing it.
///
/// Parse errors surface through the standard error path before this handler
/// runs; everything that deserializes and passes the structural checks is
/// reported valid.
pub async fn validate_delivery_config(
    State(state): State<AppState>,
    Json(config): Json<DeliveryConfig>,
) -> ApiResult<Json<ValidationResponse>> {
    state.manifests.validate(&config)?;
    Ok(Json(ValidationResponse {
        status: "valid".to_string(),
    }))
}
