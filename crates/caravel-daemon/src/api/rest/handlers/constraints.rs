//! Constraint gate handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use caravel_types::{ConstraintKey, ConstraintState, ConstraintStatus};
use serde::Deserialize;

/// Header carrying the already-authenticated caller identity
pub const USER_HEADER: &str = "x-caravel-user";

/// Query parameters for constraint history
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// List constraint state history for an environment, newest first
pub async fn get_constraint_state(
    State(state): State<AppState>,
    Path((name, environment)): Path<(String, String)>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<ConstraintState>>> {
    let history = state.gate.history(&name, &environment, params.limit).await?;
    Ok(Json(history))
}

/// Judgement request body
#[derive(Debug, Deserialize)]
pub struct UpdatedConstraintStatus {
    pub artifact_version: String,

    #[serde(rename = "type")]
    pub constraint_type: String,

    pub status: ConstraintStatus,

    #[serde(default)]
    pub comment: Option<String>,
}

/// Judge a pending constraint.
///
/// The caller identity comes from the `X-Caravel-User` header; upstream
/// layers have already authenticated it.
pub async fn update_constraint_status(
    State(state): State<AppState>,
    Path((name, environment)): Path<(String, String)>,
    headers: HeaderMap,
    Json(update): Json<UpdatedConstraintStatus>,
) -> ApiResult<Json<ConstraintState>> {
    let judged_by = caller_identity(&headers)?;

    let key = ConstraintKey::new(
        name,
        environment,
        update.artifact_version,
        update.constraint_type,
    );

    let updated = state
        .gate
        .judge(&key, update.status, update.comment, &judged_by)
        .await?;

    Ok(Json(updated))
}

fn caller_identity(headers: &HeaderMap) -> ApiResult<String> {
    let value = headers
        .get(USER_HEADER)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {} header", USER_HEADER)))?;

    let identity = value
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("invalid {} header", USER_HEADER)))?;

    if identity.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "empty {} header",
            USER_HEADER
        )));
    }

    Ok(identity.to_string())
}
