//! Vendor endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use resortops_common::billing::VendorInput;
use resortops_common::ApiError;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct VendorQuery {
    #[serde(default)]
    pub active: bool,
    pub q: Option<String>,
}

/// GET /api/vendors
pub async fn list_vendors(
    State(state): State<SharedState>,
    Query(query): Query<VendorQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let vendors = state.vendors().list(query.active, query.q.as_deref()).await?;
    Ok(Json(vendors))
}

/// GET /api/vendors/{id}
pub async fn get_vendor(State(state): State<SharedState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.vendors().get(id).await?))
}

/// POST /api/vendors
pub async fn create_vendor(
    State(state): State<SharedState>,
    Json(input): Json<VendorInput>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state.vendors().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// PUT /api/vendors/{id}
pub async fn update_vendor(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<VendorInput>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.vendors().update(id, &input).await?))
}

/// DELETE /api/vendors/{id}. Vendors that still have bills are refused with
/// 409; deactivate them instead.
pub async fn delete_vendor(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    state.vendors().delete(id).await?;
    tracing::info!(vendor_id = %id, by = %user.0.username, "Deleted vendor");
    Ok(StatusCode::NO_CONTENT)
}
