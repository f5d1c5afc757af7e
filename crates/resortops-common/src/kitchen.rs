//! Dishes and daily kitchen production reports.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::validate_money;
use crate::error::{DomainError, DomainResult};

/// Integer digits of the `NUMERIC(10,2)` price and cost columns.
pub const MENU_PRICE_DIGITS: u32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub cost_per_portion: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishInput {
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub cost_per_portion: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool { true }

impl DishInput {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("dish name is required".into()));
        }
        if self.price < Decimal::ZERO || self.cost_per_portion < Decimal::ZERO {
            return Err(DomainError::Validation("price and cost must not be negative".into()));
        }
        validate_money("price", self.price, MENU_PRICE_DIGITS)?;
        validate_money("cost_per_portion", self.cost_per_portion, MENU_PRICE_DIGITS)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenReportLine {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub prepared_qty: i32,
    pub sold_qty: i32,
    pub cost_per_portion: Decimal,
}

impl KitchenReportLine {
    pub fn wastage(&self) -> i32 {
        self.prepared_qty - self.sold_qty
    }

    pub fn wastage_cost(&self) -> Decimal {
        Decimal::from(self.wastage()) * self.cost_per_portion
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenReport {
    pub id: Uuid,
    pub report_date: NaiveDate,
    pub shift: Option<String>,
    pub prepared_by: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<KitchenReportLine>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReportLine {
    pub dish_id: Uuid,
    pub prepared_qty: i32,
    pub sold_qty: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewKitchenReport {
    pub report_date: NaiveDate,
    pub shift: Option<String>,
    pub prepared_by: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<NewReportLine>,
}

/// `prepared − sold`, rejecting negative quantities and overselling.
pub fn wastage(prepared: i32, sold: i32) -> DomainResult<i32> {
    if prepared < 0 || sold < 0 {
        return Err(DomainError::Validation("quantities must not be negative".into()));
    }
    if sold > prepared {
        return Err(DomainError::SoldExceedsPrepared { prepared: prepared as f64, sold: sold as f64 });
    }
    Ok(prepared - sold)
}

pub fn wastage_percent(prepared: i32, sold: i32) -> f64 {
    if prepared <= 0 {
        return 0.0;
    }
    (prepared - sold) as f64 / prepared as f64 * 100.0
}

pub fn validate_report(report: &NewKitchenReport) -> DomainResult<()> {
    if report.lines.is_empty() {
        return Err(DomainError::Validation("a kitchen report needs at least one dish".into()));
    }
    let mut seen = std::collections::HashSet::new();
    for line in &report.lines {
        if !seen.insert(line.dish_id) {
            return Err(DomainError::Validation(format!("dish {} listed twice", line.dish_id)));
        }
        wastage(line.prepared_qty, line.sold_qty)?;
    }
    Ok(())
}

/// Totals are widened to `i64`: each line may hold up to `i32::MAX`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReportSummary {
    pub dishes: usize,
    pub prepared: i64,
    pub sold: i64,
    pub wasted: i64,
    pub wastage_percent: f64,
    pub wastage_cost: Decimal,
}

pub fn summarize_report(lines: &[KitchenReportLine]) -> ReportSummary {
    let mut summary = lines.iter().fold(ReportSummary::default(), |mut acc, line| {
        acc.dishes += 1;
        acc.prepared += i64::from(line.prepared_qty);
        acc.sold += i64::from(line.sold_qty);
        acc.wasted += i64::from(line.wastage());
        acc.wastage_cost += line.wastage_cost();
        acc
    });
    if summary.prepared > 0 {
        summary.wastage_percent = summary.wasted as f64 / summary.prepared as f64 * 100.0;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(prepared: i32, sold: i32, cost: Decimal) -> KitchenReportLine {
        KitchenReportLine {
            dish_id: Uuid::new_v4(),
            dish_name: "Dal Makhani".into(),
            prepared_qty: prepared,
            sold_qty: sold,
            cost_per_portion: cost,
        }
    }

    #[test]
    fn test_wastage_is_prepared_minus_sold() {
        assert_eq!(wastage(40, 31).unwrap(), 9);
        assert_eq!(wastage(0, 0).unwrap(), 0);
        assert!(matches!(wastage(10, 11), Err(DomainError::SoldExceedsPrepared { .. })));
        assert!(wastage(-1, 0).is_err());
    }

    #[test]
    fn test_summary_totals() {
        let summary = summarize_report(&[line(20, 15, dec!(30)), line(10, 10, dec!(55.5))]);
        assert_eq!(summary.dishes, 2);
        assert_eq!(summary.prepared, 30);
        assert_eq!(summary.sold, 25);
        assert_eq!(summary.wasted, 5);
        assert_eq!(summary.wastage_cost, dec!(150));
        assert!((summary.wastage_percent - 16.666_666).abs() < 1e-4);
    }

    #[test]
    fn test_duplicate_dish_rejected() {
        let dish_id = Uuid::new_v4();
        let report = NewKitchenReport {
            report_date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            shift: Some("lunch".into()),
            prepared_by: None,
            notes: None,
            lines: vec![
                NewReportLine { dish_id, prepared_qty: 5, sold_qty: 5 },
                NewReportLine { dish_id, prepared_qty: 3, sold_qty: 1 },
            ],
        };
        assert!(validate_report(&report).is_err());
    }

    #[test]
    fn test_summary_of_huge_lines_does_not_overflow() {
        let summary = summarize_report(&[line(i32::MAX, 0, dec!(0)), line(i32::MAX, 1, dec!(0))]);
        assert_eq!(summary.prepared, 2 * i64::from(i32::MAX));
        assert_eq!(summary.sold, 1);
        assert_eq!(summary.wasted, 2 * i64::from(i32::MAX) - 1);
    }

    #[test]
    fn test_dish_price_scale_rejected() {
        let dish = DishInput {
            name: "Appam".into(),
            category: None,
            price: dec!(45.505),
            cost_per_portion: dec!(0),
            is_active: true,
        };
        assert!(matches!(dish.validate(), Err(DomainError::InvalidValue { field: "price", .. })));
    }

    #[test]
    fn test_wastage_percent_empty() {
        assert_eq!(wastage_percent(0, 0), 0.0);
    }
}
