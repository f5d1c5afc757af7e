//! Staff directory and payroll endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use resortops_common::staff::{month_bounds, payroll_for_month, StaffInput, StaffStatus};
use resortops_common::ApiError;
use resortops_db::StaffFilter;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct StaffQuery {
    pub department: Option<String>,
    pub status: Option<StaffStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PayrollQuery {
    /// `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
}

/// GET /api/staff
pub async fn list_staff(
    State(state): State<SharedState>,
    Query(query): Query<StaffQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = StaffFilter { department: query.department, status: query.status };
    Ok(Json(state.staff().list(&filter).await?))
}

/// GET /api/staff/{id}
pub async fn get_staff(State(state): State<SharedState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.staff().get(id).await?))
}

/// POST /api/staff
pub async fn create_staff(
    State(state): State<SharedState>,
    user: CurrentUser,
    Json(input): Json<StaffInput>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    let staff = state.staff().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

/// PUT /api/staff/{id}
pub async fn update_staff(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<StaffInput>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    Ok(Json(state.staff().update(id, &input).await?))
}

/// DELETE /api/staff/{id} marks the employee inactive; history is kept.
pub async fn deactivate_staff(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    state.staff().set_status(id, StaffStatus::Inactive).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/staff/{id}/payroll?month=YYYY-MM
pub async fn staff_payroll(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<PayrollQuery>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    let month = query.month.unwrap_or_else(|| Utc::now().format("%Y-%m").to_string());
    let (first, last) = month_bounds(&month)?;

    let staff = state.staff().get(id).await?;
    let leave = state.leave();
    let lop_days = leave.lop_days_between(id, first, last).await?;
    Ok(Json(payroll_for_month(&staff, &month, lop_days, leave.policy())))
}
