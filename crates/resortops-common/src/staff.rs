//! Staff records and monthly payroll with LOP deduction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::validate_money;
use crate::error::{DomainError, DomainResult};
use crate::leave::{lop_deduction, LeavePolicy};

/// Integer digits of the `NUMERIC(12,2)` salary column.
pub const SALARY_DIGITS: u32 = 10;

text_enum! {
    pub enum StaffStatus {
        Active => "active",
        OnLeave => "on_leave",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    pub id: Uuid,
    pub employee_code: String,
    pub full_name: String,
    pub department: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub joining_date: NaiveDate,
    pub monthly_salary: Decimal,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffInput {
    pub employee_code: String,
    pub full_name: String,
    pub department: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub joining_date: NaiveDate,
    pub monthly_salary: Decimal,
    #[serde(default = "default_status")]
    pub status: StaffStatus,
}

fn default_status() -> StaffStatus { StaffStatus::Active }

impl StaffInput {
    pub fn validate(&self) -> DomainResult<()> {
        if self.employee_code.trim().is_empty() {
            return Err(DomainError::Validation("employee code is required".into()));
        }
        if self.full_name.trim().is_empty() {
            return Err(DomainError::Validation("full name is required".into()));
        }
        if self.department.trim().is_empty() {
            return Err(DomainError::Validation("department is required".into()));
        }
        if self.monthly_salary < Decimal::ZERO {
            return Err(DomainError::InvalidValue {
                field: "monthly_salary",
                value: self.monthly_salary.to_string(),
            });
        }
        validate_money("monthly_salary", self.monthly_salary, SALARY_DIGITS)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayrollSummary {
    pub staff_id: Uuid,
    pub month: String,
    pub gross_salary: Decimal,
    pub lop_days: f64,
    pub lop_deduction: Decimal,
    pub net_salary: Decimal,
}

pub fn payroll_for_month(staff: &Staff, month: &str, lop_days: f64, policy: &LeavePolicy) -> PayrollSummary {
    let deduction = lop_deduction(staff.monthly_salary, lop_days, policy).min(staff.monthly_salary);
    PayrollSummary {
        staff_id: staff.id,
        month: month.to_string(),
        gross_salary: staff.monthly_salary,
        lop_days,
        lop_deduction: deduction,
        net_salary: staff.monthly_salary - deduction,
    }
}

/// Parse a `YYYY-MM` month into its first and last day.
pub fn month_bounds(month: &str) -> DomainResult<(NaiveDate, NaiveDate)> {
    let invalid = || DomainError::InvalidValue { field: "month", value: month.to_string() };
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").map_err(|_| invalid())?;
    let next = first.checked_add_months(chrono::Months::new(1)).ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn staff(salary: Decimal) -> Staff {
        Staff {
            id: Uuid::new_v4(),
            employee_code: "EMP-042".into(),
            full_name: "Anita Rao".into(),
            department: "Housekeeping".into(),
            designation: Some("Supervisor".into()),
            phone: None,
            email: None,
            joining_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            monthly_salary: salary,
            status: StaffStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_payroll_deducts_lop() {
        let p = payroll_for_month(&staff(dec!(18000)), "2026-05", 2.0, &LeavePolicy::default());
        assert_eq!(p.lop_deduction, dec!(1200));
        assert_eq!(p.net_salary, dec!(16800));
    }

    #[test]
    fn test_deduction_never_exceeds_salary() {
        let p = payroll_for_month(&staff(dec!(3000)), "2026-05", 45.0, &LeavePolicy::default());
        assert_eq!(p.net_salary, Decimal::ZERO);
    }

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds("2028-02").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2028, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
        assert!(month_bounds("2028-13").is_err());
        assert!(month_bounds("May").is_err());
    }

    #[test]
    fn test_input_validation() {
        let input = StaffInput {
            employee_code: " ".into(),
            full_name: "Ravi".into(),
            department: "Kitchen".into(),
            designation: None,
            phone: None,
            email: None,
            joining_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            monthly_salary: dec!(12000),
            status: StaffStatus::Active,
        };
        assert!(input.validate().is_err());
    }
}
