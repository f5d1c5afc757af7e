//! Vendor bill and payment endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use resortops_common::billing::{summarize_payables, BillPayment, BillStatus, NewBill, NewPayment, PayablesSummary, VendorBill};
use resortops_common::ApiError;
use resortops_db::BillFilter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::state::{AppEvent, SharedState};

#[derive(Debug, Default, Deserialize)]
pub struct BillQuery {
    pub vendor_id: Option<Uuid>,
    pub status: Option<BillStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl From<BillQuery> for BillFilter {
    fn from(q: BillQuery) -> Self {
        BillFilter { vendor_id: q.vendor_id, status: q.status, from: q.from, to: q.to }
    }
}

#[derive(Debug, Serialize)]
pub struct BillList {
    pub bills: Vec<VendorBill>,
    pub summary: PayablesSummary,
}

#[derive(Debug, Serialize)]
pub struct BillDetail {
    #[serde(flatten)]
    pub bill: VendorBill,
    pub balance: Decimal,
    pub payments: Vec<BillPayment>,
}

/// GET /api/bills
pub async fn list_bills(
    State(state): State<SharedState>,
    Query(query): Query<BillQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bills = state.bills().list(&query.into()).await?;
    let summary = summarize_payables(&bills, Utc::now().date_naive());
    Ok(Json(BillList { bills, summary }))
}

/// GET /api/bills/{id}
pub async fn get_bill(State(state): State<SharedState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let repo = state.bills();
    let bill = repo.get(id).await?;
    let payments = repo.payments(id).await?;
    Ok(Json(BillDetail { balance: bill.balance(), bill, payments }))
}

/// POST /api/bills
pub async fn create_bill(
    State(state): State<SharedState>,
    Json(input): Json<NewBill>,
) -> Result<impl IntoResponse, ApiError> {
    let bill = state.bills().insert(&input).await?;
    state.publish(AppEvent::BillCreated {
        bill_id: bill.id,
        vendor_id: bill.vendor_id,
        bill_number: bill.bill_number.clone(),
        total: bill.total_amount,
    });
    Ok((StatusCode::CREATED, Json(bill)))
}

/// POST /api/bills/{id}/payments
pub async fn record_payment(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payment): Json<NewPayment>,
) -> Result<impl IntoResponse, ApiError> {
    let (bill, recorded) = state.bills().record_payment(id, &payment, Some(user.0.id)).await?;
    state.publish(AppEvent::PaymentRecorded { bill_id: bill.id, amount: recorded.amount, balance: bill.balance() });
    let payments = state.bills().payments(id).await?;
    Ok((StatusCode::CREATED, Json(BillDetail { balance: bill.balance(), bill, payments })))
}
