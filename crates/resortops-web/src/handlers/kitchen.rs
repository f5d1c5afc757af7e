//! Menu and kitchen production report endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use resortops_common::kitchen::{summarize_report, DishInput, KitchenReport, NewKitchenReport, ReportSummary};
use resortops_common::ApiError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::state::{AppEvent, SharedState};

#[derive(Debug, Deserialize)]
pub struct DishQuery {
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: KitchenReport,
    pub summary: ReportSummary,
}

impl From<KitchenReport> for ReportView {
    fn from(report: KitchenReport) -> Self {
        Self { summary: summarize_report(&report.lines), report }
    }
}

/// GET /api/dishes
pub async fn list_dishes(
    State(state): State<SharedState>,
    Query(query): Query<DishQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.dishes().list(query.active).await?))
}

/// POST /api/dishes
pub async fn create_dish(
    State(state): State<SharedState>,
    Json(input): Json<DishInput>,
) -> Result<impl IntoResponse, ApiError> {
    let dish = state.dishes().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

/// PUT /api/dishes/{id}
pub async fn update_dish(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<DishInput>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.dishes().update(id, &input).await?))
}

/// GET /api/kitchen/reports
pub async fn list_reports(
    State(state): State<SharedState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let reports = state.kitchen_reports().list(query.from, query.to).await?;
    Ok(Json(reports.into_iter().map(ReportView::from).collect::<Vec<_>>()))
}

/// GET /api/kitchen/reports/{id}
pub async fn get_report(State(state): State<SharedState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(ReportView::from(state.kitchen_reports().get(id).await?)))
}

/// POST /api/kitchen/reports
pub async fn create_report(
    State(state): State<SharedState>,
    user: CurrentUser,
    Json(input): Json<NewKitchenReport>,
) -> Result<impl IntoResponse, ApiError> {
    let view = ReportView::from(state.kitchen_reports().insert(&input, Some(user.0.id)).await?);
    state.publish(AppEvent::KitchenReportFiled {
        report_id: view.report.id,
        report_date: view.report.report_date,
        wasted: view.summary.wasted,
    });
    Ok((StatusCode::CREATED, Json(view)))
}
