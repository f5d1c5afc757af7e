//! KOT (kitchen order ticket) revenue analytics.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::validate_money;
use crate::error::{DomainError, DomainResult};
use crate::kitchen::MENU_PRICE_DIGITS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KotLine {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl KotLine {
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kot {
    pub id: Uuid,
    pub kot_number: String,
    pub outlet: String,
    pub table_no: Option<String>,
    pub served_at: DateTime<Utc>,
    pub lines: Vec<KotLine>,
    pub created_at: DateTime<Utc>,
}

impl Kot {
    pub fn total(&self) -> Decimal {
        kot_total(&self.lines)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewKotLine {
    pub dish_id: Uuid,
    pub quantity: i32,
    /// Falls back to the dish's list price when absent.
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewKot {
    pub kot_number: String,
    pub outlet: String,
    pub table_no: Option<String>,
    pub served_at: Option<DateTime<Utc>>,
    pub lines: Vec<NewKotLine>,
}

impl NewKot {
    pub fn validate(&self) -> DomainResult<()> {
        if self.kot_number.trim().is_empty() {
            return Err(DomainError::Validation("KOT number is required".into()));
        }
        if self.outlet.trim().is_empty() {
            return Err(DomainError::Validation("outlet is required".into()));
        }
        if self.lines.is_empty() {
            return Err(DomainError::Validation("a KOT needs at least one line".into()));
        }
        for line in &self.lines {
            if line.quantity <= 0 {
                return Err(DomainError::InvalidValue { field: "quantity", value: line.quantity.to_string() });
            }
            if matches!(line.unit_price, Some(p) if p < Decimal::ZERO) {
                return Err(DomainError::Validation("unit price must not be negative".into()));
            }
            if let Some(price) = line.unit_price {
                validate_money("unit_price", price, MENU_PRICE_DIGITS)?;
            }
        }
        Ok(())
    }
}

pub fn kot_total(lines: &[KotLine]) -> Decimal {
    lines.iter().map(KotLine::amount).sum()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub tickets: usize,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutletRevenue {
    pub outlet: String,
    pub tickets: usize,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DishRevenue {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RevenueSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_revenue: Decimal,
    pub tickets: usize,
    pub average_ticket: Decimal,
    pub daily: Vec<DailyRevenue>,
    pub by_outlet: Vec<OutletRevenue>,
    pub top_dishes: Vec<DishRevenue>,
}

/// Roll KOTs served between `from` and `to` (inclusive, UTC dates) into a
/// revenue summary. `top_n` bounds the dish ranking.
pub fn revenue_summary(kots: &[Kot], from: NaiveDate, to: NaiveDate, top_n: usize) -> DomainResult<RevenueSummary> {
    if to < from {
        return Err(DomainError::InvalidDateRange { start: from, end: to });
    }

    let mut daily: BTreeMap<NaiveDate, (usize, Decimal)> = BTreeMap::new();
    let mut outlets: BTreeMap<String, (usize, Decimal)> = BTreeMap::new();
    let mut dishes: HashMap<Uuid, DishRevenue> = HashMap::new();
    let mut total = Decimal::ZERO;
    let mut tickets = 0usize;

    for kot in kots {
        let day = kot.served_at.date_naive();
        if day < from || day > to {
            continue;
        }
        let amount = kot.total();
        total += amount;
        tickets += 1;

        let d = daily.entry(day).or_insert((0, Decimal::ZERO));
        d.0 += 1;
        d.1 += amount;

        let o = outlets.entry(kot.outlet.clone()).or_insert((0, Decimal::ZERO));
        o.0 += 1;
        o.1 += amount;

        for line in &kot.lines {
            let entry = dishes.entry(line.dish_id).or_insert_with(|| DishRevenue {
                dish_id: line.dish_id,
                dish_name: line.dish_name.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
            entry.quantity += line.quantity as i64;
            entry.revenue += line.amount();
        }
    }

    let average_ticket = if tickets == 0 {
        Decimal::ZERO
    } else {
        (total / Decimal::from(tickets)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    let mut top_dishes: Vec<DishRevenue> = dishes.into_values().collect();
    top_dishes.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.dish_name.cmp(&b.dish_name)));
    top_dishes.truncate(top_n);

    let mut by_outlet: Vec<OutletRevenue> = outlets
        .into_iter()
        .map(|(outlet, (tickets, revenue))| OutletRevenue { outlet, tickets, revenue })
        .collect();
    by_outlet.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.outlet.cmp(&b.outlet)));

    Ok(RevenueSummary {
        from,
        to,
        total_revenue: total,
        tickets,
        average_ticket,
        daily: daily
            .into_iter()
            .map(|(date, (tickets, revenue))| DailyRevenue { date, tickets, revenue })
            .collect(),
        by_outlet,
        top_dishes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn kot(outlet: &str, day: u32, lines: Vec<(Uuid, &str, i32, Decimal)>) -> Kot {
        Kot {
            id: Uuid::new_v4(),
            kot_number: format!("K-{day}"),
            outlet: outlet.into(),
            table_no: None,
            served_at: Utc.with_ymd_and_hms(2026, 7, day, 13, 0, 0).unwrap(),
            lines: lines
                .into_iter()
                .map(|(dish_id, name, quantity, unit_price)| KotLine {
                    dish_id,
                    dish_name: name.into(),
                    quantity,
                    unit_price,
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_groups_by_day_outlet_and_dish() {
        let biryani = Uuid::new_v4();
        let lassi = Uuid::new_v4();
        let kots = vec![
            kot("Poolside", 1, vec![(biryani, "Biryani", 2, dec!(350)), (lassi, "Lassi", 2, dec!(90))]),
            kot("Restaurant", 1, vec![(biryani, "Biryani", 1, dec!(350))]),
            kot("Restaurant", 2, vec![(lassi, "Lassi", 3, dec!(90))]),
            kot("Restaurant", 9, vec![(biryani, "Biryani", 10, dec!(350))]),
        ];
        let from = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 7, 2).unwrap();
        let summary = revenue_summary(&kots, from, to, 5).unwrap();

        assert_eq!(summary.tickets, 3);
        assert_eq!(summary.total_revenue, dec!(1500));
        assert_eq!(summary.average_ticket, dec!(500));
        assert_eq!(summary.daily.len(), 2);
        assert_eq!(summary.daily[0].revenue, dec!(1230));
        assert_eq!(summary.by_outlet[0].outlet, "Poolside");
        assert_eq!(summary.by_outlet[0].revenue, dec!(880));
        assert_eq!(summary.top_dishes[0].dish_name, "Biryani");
        assert_eq!(summary.top_dishes[0].quantity, 3);
        assert_eq!(summary.top_dishes[1].revenue, dec!(450));
    }

    #[test]
    fn test_empty_range() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let summary = revenue_summary(&[], day, day, 3).unwrap();
        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.average_ticket, Decimal::ZERO);
        assert!(revenue_summary(&[], day, day.pred_opt().unwrap(), 3).is_err());
    }

    #[test]
    fn test_new_kot_validation() {
        let mut new_kot = NewKot {
            kot_number: "K-100".into(),
            outlet: "Bar".into(),
            table_no: Some("T4".into()),
            served_at: None,
            lines: vec![NewKotLine { dish_id: Uuid::new_v4(), quantity: 0, unit_price: None }],
        };
        assert!(new_kot.validate().is_err());
        new_kot.lines[0].quantity = 2;
        assert!(new_kot.validate().is_ok());
    }
}
