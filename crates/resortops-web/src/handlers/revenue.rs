//! KOT capture and revenue analytics.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use resortops_common::revenue::{revenue_summary, NewKot, RevenueSummary};
use resortops_common::ApiError;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::state::SharedState;

const TOP_DISHES: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct RevenueQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct KotCreated {
    pub id: uuid::Uuid,
    pub kot_number: String,
    pub total: rust_decimal::Decimal,
}

/// POST /api/kots
pub async fn create_kot(
    State(state): State<SharedState>,
    user: CurrentUser,
    Json(input): Json<NewKot>,
) -> Result<impl IntoResponse, ApiError> {
    let kot = state.kots().insert(&input, Some(user.0.id)).await?;
    Ok((StatusCode::CREATED, Json(KotCreated { id: kot.id, total: kot.total(), kot_number: kot.kot_number })))
}

/// Inclusive date range, defaulting to the last 30 days.
pub fn resolve_range(query: &RevenueQuery, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let to = query.to.unwrap_or(today);
    let from = query.from.unwrap_or(to - Duration::days(29));
    (from, to)
}

pub async fn summary_for(state: &SharedState, query: &RevenueQuery) -> Result<RevenueSummary, ApiError> {
    let (from, to) = resolve_range(query, Utc::now().date_naive());
    if to < from {
        return Err(ApiError::BadRequest(format!("'to' ({to}) is before 'from' ({from})")));
    }
    let start = from.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    let end = (to + Duration::days(1)).and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ApiError::BadRequest("invalid date range".into()));
    };

    let kots = state.kots().list_between(start, end).await?;
    Ok(revenue_summary(&kots, from, to, TOP_DISHES)?)
}

/// GET /api/revenue?from=&to=
pub async fn revenue(
    State(state): State<SharedState>,
    Query(query): Query<RevenueQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(summary_for(&state, &query).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range_is_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let (from, to) = resolve_range(&RevenueQuery::default(), today);
        assert_eq!(to, today);
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

        let query = RevenueQuery { from: Some(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()), to: None };
        assert_eq!(resolve_range(&query, today).0, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    }
}
