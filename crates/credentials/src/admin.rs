//! Admin endpoints for slot assignment and the key pool

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, Result};
use crate::registry::{CredentialRegistry, KeyValidator, PoolKey, PoolKeyUpdate, SlotSummary};

/// Shared state for the admin routes
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<CredentialRegistry>,
    pub validator: Arc<dyn KeyValidator>,
}

/// Create the admin router
pub fn admin_router() -> Router<AdminState> {
    Router::new()
        .route("/api/admin/config", get(config))
        .route("/api/admin/pool", get(list_pool).post(add_pool_key))
        .route("/api/admin/pool/{id}", patch(update_pool_key).delete(remove_pool_key))
        .route("/api/admin/assign", post(assign))
}

#[derive(Serialize)]
struct ConfigResponse {
    keys: Vec<SlotSummary>,
}

#[derive(Deserialize)]
struct AddKeyRequest {
    key: Option<String>,
    label: Option<String>,
}

#[derive(Serialize)]
struct AddKeyResponse {
    success: bool,
    key: PoolKey,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignRequest {
    slot_index: Option<i64>,
    api_key: Option<String>,
    label: Option<String>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn payload<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| CredentialError::InvalidRequest(rejection.body_text()))
}

async fn config(State(state): State<AdminState>) -> Result<Json<ConfigResponse>> {
    Ok(Json(ConfigResponse {
        keys: state.registry.slots().await?,
    }))
}

async fn list_pool(State(state): State<AdminState>) -> Result<Json<Vec<PoolKey>>> {
    Ok(Json(state.registry.pool().await?))
}

async fn add_pool_key(
    State(state): State<AdminState>,
    body: std::result::Result<Json<AddKeyRequest>, JsonRejection>,
) -> Result<Json<AddKeyResponse>> {
    let request = payload(body)?;

    let key = request
        .key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| CredentialError::InvalidRequest("Key is required".to_string()))?;

    let key = state
        .registry
        .add_to_pool(state.validator.as_ref(), key, request.label)
        .await?;

    Ok(Json(AddKeyResponse { success: true, key }))
}

async fn update_pool_key(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<PoolKeyUpdate>, JsonRejection>,
) -> Result<Json<PoolKey>> {
    let update = payload(body)?;
    Ok(Json(state.registry.update_pool_key(&id, update).await?))
}

async fn remove_pool_key(State(state): State<AdminState>, Path(id): Path<String>) -> Result<Json<SuccessResponse>> {
    state.registry.remove_from_pool(&id).await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: None,
    }))
}

async fn assign(
    State(state): State<AdminState>,
    body: std::result::Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let request = payload(body)?;

    let (Some(slot_index), Some(api_key)) = (request.slot_index, request.api_key.filter(|key| !key.is_empty()))
    else {
        return Err(CredentialError::InvalidRequest("Missing slot index or API key".to_string()));
    };

    let index = state
        .registry
        .assign(slot_index, &api_key, request.label.as_deref())
        .await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: Some(format!("Assigned to Slot {}", index + 1)),
    }))
}
