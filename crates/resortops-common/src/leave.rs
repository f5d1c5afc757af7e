//! Leave management: EL accrual, per-type balances and LOP overflow.
//!
//! Earned leave accrues a fixed amount per completed week of service in the
//! calendar year, capped at the annual limit. Sick and casual leave come from
//! fixed annual quotas. Whatever part of a request the balance cannot cover
//! is booked as loss of pay and deducted from salary at
//! `monthly_salary / lop_divisor_days` per day.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

text_enum! {
    pub enum LeaveType {
        Earned => "earned",
        Sick => "sick",
        Casual => "casual",
        LossOfPay => "loss_of_pay",
    }
}

text_enum! {
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

impl LeaveStatus {
    /// Allowed status changes. Decided requests can only be cancelled, and
    /// only if they were approved.
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (LeaveStatus::Pending, LeaveStatus::Approved)
                | (LeaveStatus::Pending, LeaveStatus::Rejected)
                | (LeaveStatus::Pending, LeaveStatus::Cancelled)
                | (LeaveStatus::Approved, LeaveStatus::Cancelled)
        )
    }

    pub fn transition(self, next: LeaveStatus) -> DomainResult<LeaveStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                entity: "leave request",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LeavePolicy {
    pub el_accrual_per_week: f64,
    pub el_annual_cap: f64,
    pub sick_quota: f64,
    pub casual_quota: f64,
    pub lop_divisor_days: u32,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            el_accrual_per_week: 0.25,
            el_annual_cap: 12.0,
            sick_quota: 7.0,
            casual_quota: 7.0,
            lop_divisor_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: f64,
    pub covered_days: f64,
    pub lop_days: f64,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLeaveRequest {
    pub staff_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Days already consumed in a year, from approved requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct UsedLeave {
    pub earned: f64,
    pub sick: f64,
    pub casual: f64,
    pub loss_of_pay: f64,
}

impl UsedLeave {
    pub fn add(&mut self, leave_type: LeaveType, covered: f64, lop: f64) {
        match leave_type {
            LeaveType::Earned => self.earned += covered,
            LeaveType::Sick => self.sick += covered,
            LeaveType::Casual => self.casual += covered,
            LeaveType::LossOfPay => {}
        }
        self.loss_of_pay += lop;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaveBalance {
    pub year: i32,
    pub el_accrued: f64,
    pub el_used: f64,
    pub el_available: f64,
    pub sick_used: f64,
    pub sick_available: f64,
    pub casual_used: f64,
    pub casual_available: f64,
    pub lop_taken: f64,
}

impl LeaveBalance {
    pub fn available(&self, leave_type: LeaveType) -> f64 {
        match leave_type {
            LeaveType::Earned => self.el_available,
            LeaveType::Sick => self.sick_available,
            LeaveType::Casual => self.casual_available,
            LeaveType::LossOfPay => 0.0,
        }
    }
}

/// How a request is booked: days charged to the requested type and days
/// overflowing into loss of pay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LeaveSplit {
    pub covered: f64,
    pub lop: f64,
}

/// Inclusive number of calendar days between two dates.
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> DomainResult<f64> {
    if end < start {
        return Err(DomainError::InvalidDateRange { start, end });
    }
    Ok(((end - start).num_days() + 1) as f64)
}

pub fn el_accrued(policy: &LeavePolicy, joining_date: NaiveDate, as_of: NaiveDate) -> f64 {
    let year_start = NaiveDate::from_ymd_opt(as_of.year(), 1, 1).unwrap_or(as_of);
    let from = joining_date.max(year_start);
    if as_of < from {
        return 0.0;
    }
    let weeks = (as_of - from).num_days() / 7;
    (weeks as f64 * policy.el_accrual_per_week).min(policy.el_annual_cap)
}

pub fn leave_balance(policy: &LeavePolicy, year: i32, accrued: f64, used: &UsedLeave) -> LeaveBalance {
    LeaveBalance {
        year,
        el_accrued: accrued,
        el_used: used.earned,
        el_available: (accrued - used.earned).max(0.0),
        sick_used: used.sick,
        sick_available: (policy.sick_quota - used.sick).max(0.0),
        casual_used: used.casual,
        casual_available: (policy.casual_quota - used.casual).max(0.0),
        lop_taken: used.loss_of_pay,
    }
}

pub fn split_request(balance: &LeaveBalance, leave_type: LeaveType, days: f64) -> LeaveSplit {
    let covered = days.min(balance.available(leave_type)).max(0.0);
    LeaveSplit { covered, lop: days - covered }
}

/// Salary deducted for `lop_days`, rounded to two decimals.
pub fn lop_deduction(monthly_salary: Decimal, lop_days: f64, policy: &LeavePolicy) -> Decimal {
    if lop_days <= 0.0 || policy.lop_divisor_days == 0 {
        return Decimal::ZERO;
    }
    let per_day = monthly_salary / Decimal::from(policy.lop_divisor_days);
    let days = Decimal::from_f64(lop_days).unwrap_or(Decimal::ZERO);
    (per_day * days).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn validate_request(req: &NewLeaveRequest) -> DomainResult<f64> {
    leave_days(req.start_date, req.end_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_leave_days_inclusive() {
        assert_eq!(leave_days(date(2026, 3, 1), date(2026, 3, 1)).unwrap(), 1.0);
        assert_eq!(leave_days(date(2026, 2, 27), date(2026, 3, 2)).unwrap(), 4.0);
        assert!(leave_days(date(2026, 3, 2), date(2026, 3, 1)).is_err());
    }

    #[test]
    fn test_accrual_counts_weeks_in_current_year() {
        let policy = LeavePolicy::default();
        // Joined years ago: weeks since Jan 1
        assert_eq!(el_accrued(&policy, date(2020, 6, 1), date(2026, 3, 5)), 9.0 * 0.25);
        // Joined mid-year: weeks since joining
        assert_eq!(el_accrued(&policy, date(2026, 2, 1), date(2026, 2, 22)), 0.75);
        // Not joined yet
        assert_eq!(el_accrued(&policy, date(2026, 9, 1), date(2026, 3, 1)), 0.0);
    }

    #[test]
    fn test_accrual_capped() {
        let policy = LeavePolicy::default();
        assert_eq!(el_accrued(&policy, date(2010, 1, 1), date(2026, 12, 31)), 12.0);
    }

    #[test]
    fn test_el_available_is_limit_minus_used() {
        let policy = LeavePolicy::default();
        let used = UsedLeave { earned: 2.0, sick: 1.0, ..Default::default() };
        let bal = leave_balance(&policy, 2026, 5.0, &used);
        assert_eq!(bal.el_available, 3.0);
        assert_eq!(bal.sick_available, 6.0);
        assert_eq!(bal.casual_available, 7.0);

        let over = UsedLeave { earned: 8.0, ..Default::default() };
        assert_eq!(leave_balance(&policy, 2026, 5.0, &over).el_available, 0.0);
    }

    #[test]
    fn test_overflow_goes_to_lop() {
        let policy = LeavePolicy::default();
        let bal = leave_balance(&policy, 2026, 2.5, &UsedLeave::default());
        assert_eq!(split_request(&bal, LeaveType::Earned, 4.0), LeaveSplit { covered: 2.5, lop: 1.5 });
        assert_eq!(split_request(&bal, LeaveType::Casual, 3.0), LeaveSplit { covered: 3.0, lop: 0.0 });
        assert_eq!(split_request(&bal, LeaveType::LossOfPay, 2.0), LeaveSplit { covered: 0.0, lop: 2.0 });
    }

    #[test]
    fn test_lop_deduction() {
        let policy = LeavePolicy::default();
        assert_eq!(lop_deduction(dec!(30000), 1.5, &policy), dec!(1500.00));
        assert_eq!(lop_deduction(dec!(25000), 1.0, &policy), dec!(833.33));
        assert_eq!(lop_deduction(dec!(25000), 0.0, &policy), Decimal::ZERO);
    }

    #[test]
    fn test_status_transitions() {
        assert!(LeaveStatus::Pending.transition(LeaveStatus::Approved).is_ok());
        assert!(LeaveStatus::Approved.transition(LeaveStatus::Cancelled).is_ok());
        assert!(LeaveStatus::Rejected.transition(LeaveStatus::Approved).is_err());
        assert!(LeaveStatus::Approved.transition(LeaveStatus::Rejected).is_err());
    }

    #[test]
    fn test_used_leave_accumulates_lop_for_every_type() {
        let mut used = UsedLeave::default();
        used.add(LeaveType::Earned, 2.0, 1.0);
        used.add(LeaveType::LossOfPay, 0.0, 3.0);
        assert_eq!(used.earned, 2.0);
        assert_eq!(used.loss_of_pay, 4.0);
    }
}
