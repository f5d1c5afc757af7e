//! Leave requests and balances.
//!
//! Balances are computed on read from approved requests in the year of their
//! start date. The covered/LOP split is computed when a request is filed and
//! recomputed on approval, inside the transaction that locks the request, so
//! two approvals cannot both spend the same remaining days.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use resortops_common::leave::{
    el_accrued, leave_balance, split_request, validate_request, LeaveBalance, LeavePolicy, LeaveRequest,
    LeaveStatus, LeaveType, NewLeaveRequest, UsedLeave,
};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{parse_column, LeaveRow};

const LEAVE_COLUMNS: &str = "id, staff_id, leave_type, start_date, end_date, days, covered_days, lop_days, \
     reason, status, decided_by, decided_at, created_at";

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub staff_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
    pub year: Option<i32>,
}

#[derive(Clone)]
pub struct LeaveRepository {
    db: Arc<Database>,
    policy: LeavePolicy,
}

impl LeaveRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db, policy: LeavePolicy::default() }
    }

    pub fn with_policy(mut self, policy: LeavePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    pub async fn list(&self, filter: &LeaveFilter) -> Result<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests
             WHERE ($1::UUID IS NULL OR staff_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::INT IS NULL OR EXTRACT(YEAR FROM start_date)::INT = $3)
             ORDER BY start_date DESC, created_at DESC"
        ))
        .bind(filter.staff_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.year)
        .fetch_all(self.db.pool())
        .await?;
        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<LeaveRequest> {
        sqlx::query_as::<_, LeaveRow>(&format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| DbError::NotFound(format!("leave request {id}")))?
            .try_into()
    }

    /// File a pending request with a provisional covered/LOP split.
    pub async fn insert(&self, req: &NewLeaveRequest) -> Result<LeaveRequest> {
        let days = validate_request(req)?;

        let mut conn = self.db.pool().acquire().await?;
        let reference = req.start_date.max(Utc::now().date_naive());
        let balance = self.balance_on(&mut *conn, req.staff_id, req.start_date.year(), reference).await?;
        let split = split_request(&balance, req.leave_type, days);

        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "INSERT INTO leave_requests
                (id, staff_id, leave_type, start_date, end_date, days, covered_days, lop_days, reason, status)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
             RETURNING {LEAVE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.staff_id)
        .bind(req.leave_type.as_str())
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(days)
        .bind(split.covered)
        .bind(split.lop)
        .bind(&req.reason)
        .bind(LeaveStatus::Pending.as_str())
        .fetch_one(&mut *conn)
        .await?;

        tracing::debug!(
            request_id = %row.id,
            staff_id = %req.staff_id,
            leave_type = %req.leave_type,
            days,
            lop = split.lop,
            "Filed leave request"
        );
        row.try_into()
    }

    /// Move a request to `next`. Approval rebooks the split against the
    /// balance at that moment.
    /// Move a request to `next`. Cancelling an already approved request
    /// releases its balance and LOP, so it needs `can_revoke`; the check runs
    /// under the row lock.
    pub async fn decide(
        &self,
        id: Uuid,
        next: LeaveStatus,
        decided_by: Option<Uuid>,
        can_revoke: bool,
    ) -> Result<LeaveRequest> {
        let mut tx = self.db.pool().begin().await?;

        let current: LeaveRequest = sqlx::query_as::<_, LeaveRow>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("leave request {id}")))?
        .try_into()?;

        let status = current.status.transition(next)?;
        if current.status == LeaveStatus::Approved && status == LeaveStatus::Cancelled && !can_revoke {
            return Err(DbError::Forbidden("only a manager can cancel approved leave".into()));
        }

        let (covered, lop) = if status == LeaveStatus::Approved {
            // Serialise approvals for the same employee.
            sqlx::query("SELECT id FROM staff WHERE id = $1 FOR UPDATE")
                .bind(current.staff_id)
                .execute(&mut *tx)
                .await?;
            let reference = current.start_date.max(Utc::now().date_naive());
            let balance = self
                .balance_on(&mut *tx, current.staff_id, current.start_date.year(), reference)
                .await?;
            let split = split_request(&balance, current.leave_type, current.days);
            (split.covered, split.lop)
        } else {
            (current.covered_days, current.lop_days)
        };

        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "UPDATE leave_requests
             SET status = $2, covered_days = $3, lop_days = $4, decided_by = $5, decided_at = now()
             WHERE id = $1
             RETURNING {LEAVE_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(covered)
        .bind(lop)
        .bind(decided_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(request_id = %id, from = %current.status, to = %status, lop, "Leave request decided");
        row.try_into()
    }

    /// Total approved LOP days for requests starting within `[from, to]`.
    pub async fn lop_days_between(&self, staff_id: Uuid, from: NaiveDate, to: NaiveDate) -> Result<f64> {
        let total: Option<f64> = sqlx::query_scalar(
            "SELECT SUM(lop_days) FROM leave_requests
             WHERE staff_id = $1 AND status = 'approved'
               AND start_date >= $2 AND start_date <= $3",
        )
        .bind(staff_id)
        .bind(from)
        .bind(to)
        .fetch_one(self.db.pool())
        .await?;
        Ok(total.unwrap_or(0.0))
    }

    /// Balance for `year`, with EL accrued up to `as_of` (clamped to the year).
    pub async fn balance(&self, staff_id: Uuid, year: i32, as_of: NaiveDate) -> Result<LeaveBalance> {
        let mut conn = self.db.pool().acquire().await?;
        self.balance_on(&mut *conn, staff_id, year, as_of).await
    }

    async fn balance_on(
        &self,
        conn: &mut PgConnection,
        staff_id: Uuid,
        year: i32,
        as_of: NaiveDate,
    ) -> Result<LeaveBalance> {
        let joining_date: NaiveDate = sqlx::query_scalar("SELECT joining_date FROM staff WHERE id = $1")
            .bind(staff_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("staff {staff_id}")))?;

        let used = used_in_year(conn, staff_id, year).await?;
        let accrued = el_accrued(&self.policy, joining_date, clamp_to_year(as_of, year));
        Ok(leave_balance(&self.policy, year, accrued, &used))
    }
}

async fn used_in_year(conn: &mut PgConnection, staff_id: Uuid, year: i32) -> Result<UsedLeave> {
    let rows: Vec<(String, f64, f64)> = sqlx::query_as(
        "SELECT leave_type, COALESCE(SUM(covered_days), 0), COALESCE(SUM(lop_days), 0)
         FROM leave_requests
         WHERE staff_id = $1 AND status = 'approved'
           AND EXTRACT(YEAR FROM start_date)::INT = $2
         GROUP BY leave_type",
    )
    .bind(staff_id)
    .bind(year)
    .fetch_all(&mut *conn)
    .await?;

    let mut used = UsedLeave::default();
    for (leave_type, covered, lop) in rows {
        let leave_type: LeaveType = parse_column("leave_requests.leave_type", &leave_type)?;
        used.add(leave_type, covered, lop);
    }
    Ok(used)
}

fn clamp_to_year(date: NaiveDate, year: i32) -> NaiveDate {
    match (NaiveDate::from_ymd_opt(year, 1, 1), NaiveDate::from_ymd_opt(year, 12, 31)) {
        (Some(first), Some(last)) => date.clamp(first, last),
        _ => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clamp_to_year() {
        assert_eq!(clamp_to_year(date(2026, 5, 4), 2026), date(2026, 5, 4));
        assert_eq!(clamp_to_year(date(2027, 2, 1), 2026), date(2026, 12, 31));
        assert_eq!(clamp_to_year(date(2025, 7, 1), 2026), date(2026, 1, 1));
    }
}
