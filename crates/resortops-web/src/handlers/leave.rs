//! Leave request and balance endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Datelike, Utc};
use resortops_common::leave::{LeaveStatus, NewLeaveRequest};
use resortops_common::ApiError;
use resortops_db::LeaveFilter;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::state::{AppEvent, SharedState};

#[derive(Debug, Deserialize)]
pub struct LeaveQuery {
    pub staff_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct Decision {
    pub status: LeaveStatus,
}

/// GET /api/leave
pub async fn list_requests(
    State(state): State<SharedState>,
    Query(query): Query<LeaveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = LeaveFilter { staff_id: query.staff_id, status: query.status, year: query.year };
    Ok(Json(state.leave().list(&filter).await?))
}

/// POST /api/leave
pub async fn create_request(
    State(state): State<SharedState>,
    Json(input): Json<NewLeaveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state.leave().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /api/leave/{id}/decision
pub async fn decide_request(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(decision): Json<Decision>,
) -> Result<impl IntoResponse, ApiError> {
    if decision.status == LeaveStatus::Pending {
        return Err(ApiError::BadRequest("a decision must approve, reject or cancel".into()));
    }
    if decision.status != LeaveStatus::Cancelled {
        user.require_manager()?;
    }

    let can_revoke = user.0.role.can_manage();
    let request = state.leave().decide(id, decision.status, Some(user.0.id), can_revoke).await?;
    state.publish(AppEvent::LeaveDecided {
        request_id: request.id,
        staff_id: request.staff_id,
        status: request.status.to_string(),
        lop_days: request.lop_days,
    });
    Ok(Json(request))
}

/// GET /api/leave/balance/{staff_id}?year=
pub async fn leave_balance(
    State(state): State<SharedState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<BalanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    Ok(Json(state.leave().balance(staff_id, year, today).await?))
}
