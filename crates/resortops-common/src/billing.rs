//! Vendor billing: bills, payments and the balance identity
//! `balance = total − sum(payments)`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

text_enum! {
    /// Settlement state of a vendor bill. Always derived from the amounts via
    /// [`bill_status`], never set directly.
    pub enum BillStatus {
        Unpaid => "unpaid",
        PartiallyPaid => "partially_paid",
        Paid => "paid",
        Overdue => "overdue",
    }
}

text_enum! {
    pub enum PaymentMethod {
        Cash => "cash",
        BankTransfer => "bank_transfer",
        Upi => "upi",
        Cheque => "cheque",
        Card => "card",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or editing a vendor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool { true }

impl VendorInput {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("vendor name is required".into()));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                return Err(DomainError::InvalidValue { field: "email", value: email.to_string() });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorBill {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub bill_number: String,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: BillStatus,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VendorBill {
    pub fn balance(&self) -> Decimal {
        bill_balance(self.total_amount, self.paid_amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBill {
    pub vendor_id: Uuid,
    pub bill_number: String,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillPayment {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    pub reference: Option<String>,
    pub note: Option<String>,
}

pub fn bill_balance(total: Decimal, paid: Decimal) -> Decimal {
    total - paid
}

/// Derive the status of a bill from its amounts and due date.
pub fn bill_status(
    total: Decimal,
    paid: Decimal,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> BillStatus {
    let balance = bill_balance(total, paid);
    if balance <= Decimal::ZERO {
        return BillStatus::Paid;
    }
    if matches!(due_date, Some(due) if today > due) {
        return BillStatus::Overdue;
    }
    if paid > Decimal::ZERO {
        BillStatus::PartiallyPaid
    } else {
        BillStatus::Unpaid
    }
}

/// Integer digits of the `NUMERIC(14,2)` bill and payment columns.
pub const BILL_AMOUNT_DIGITS: u32 = 12;

/// Reject amounts PostgreSQL would round or overflow: more than two decimal
/// places, or more integer digits than the column holds.
pub fn validate_money(field: &'static str, amount: Decimal, integer_digits: u32) -> DomainResult<()> {
    let limit = Decimal::from_i128_with_scale(10i128.pow(integer_digits + 2) - 1, 2);
    if amount.normalize().scale() > 2 || amount.abs() > limit {
        return Err(DomainError::InvalidValue { field, value: amount.to_string() });
    }
    Ok(())
}

pub fn validate_new_bill(bill: &NewBill) -> DomainResult<()> {
    if bill.bill_number.trim().is_empty() {
        return Err(DomainError::Validation("bill number is required".into()));
    }
    if bill.total_amount <= Decimal::ZERO {
        return Err(DomainError::Validation("bill total must be greater than zero".into()));
    }
    validate_money("total_amount", bill.total_amount, BILL_AMOUNT_DIGITS)?;
    if let Some(due) = bill.due_date {
        if due < bill.bill_date {
            return Err(DomainError::InvalidDateRange { start: bill.bill_date, end: due });
        }
    }
    Ok(())
}

/// Check a payment against the bill it settles. Returns the new paid amount.
pub fn validate_payment(total: Decimal, paid_so_far: Decimal, amount: Decimal) -> DomainResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::Validation("payment amount must be greater than zero".into()));
    }
    validate_money("amount", amount, BILL_AMOUNT_DIGITS)?;
    let balance = bill_balance(total, paid_so_far);
    if amount > balance {
        return Err(DomainError::Overpayment { balance, amount });
    }
    Ok(paid_so_far + amount)
}

/// Outstanding totals per vendor, used by the dashboard and bill exports.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PayablesSummary {
    pub bill_count: usize,
    pub total_billed: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    pub overdue_count: usize,
}

pub fn summarize_payables(bills: &[VendorBill], today: NaiveDate) -> PayablesSummary {
    bills.iter().fold(PayablesSummary::default(), |mut acc, bill| {
        acc.bill_count += 1;
        acc.total_billed += bill.total_amount;
        acc.total_paid += bill.paid_amount;
        acc.outstanding += bill.balance();
        if bill_status(bill.total_amount, bill.paid_amount, bill.due_date, today) == BillStatus::Overdue {
            acc.overdue_count += 1;
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(total: Decimal, paid: Decimal, due: Option<NaiveDate>) -> VendorBill {
        VendorBill {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            bill_number: "INV-1".into(),
            bill_date: date(2026, 1, 1),
            due_date: due,
            description: None,
            total_amount: total,
            paid_amount: paid,
            status: BillStatus::Unpaid,
            attachment_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_follows_amounts() {
        let today = date(2026, 3, 1);
        assert_eq!(bill_status(dec!(1000), dec!(0), None, today), BillStatus::Unpaid);
        assert_eq!(bill_status(dec!(1000), dec!(400), None, today), BillStatus::PartiallyPaid);
        assert_eq!(bill_status(dec!(1000), dec!(1000), None, today), BillStatus::Paid);
    }

    #[test]
    fn test_overdue_only_with_outstanding_balance() {
        let due = Some(date(2026, 2, 1));
        let today = date(2026, 3, 1);
        assert_eq!(bill_status(dec!(500), dec!(100), due, today), BillStatus::Overdue);
        assert_eq!(bill_status(dec!(500), dec!(500), due, today), BillStatus::Paid);
        // Due today is not yet overdue
        assert_eq!(bill_status(dec!(500), dec!(0), due, date(2026, 2, 1)), BillStatus::Unpaid);
    }

    #[test]
    fn test_payment_cannot_exceed_balance() {
        assert_eq!(validate_payment(dec!(1000), dec!(250), dec!(750)).unwrap(), dec!(1000));
        let err = validate_payment(dec!(1000), dec!(250), dec!(750.01)).unwrap_err();
        assert_eq!(err, DomainError::Overpayment { balance: dec!(750), amount: dec!(750.01) });
    }

    #[test]
    fn test_zero_payment_rejected() {
        assert!(matches!(
            validate_payment(dec!(10), dec!(0), dec!(0)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_amounts_must_fit_numeric_column() {
        // 99.996 would be stored as 100.00 and settle the bill behind our back
        assert!(matches!(
            validate_payment(dec!(100.00), dec!(0), dec!(99.996)),
            Err(DomainError::InvalidValue { field: "amount", .. })
        ));
        assert!(matches!(
            validate_payment(dec!(100.00), dec!(0), dec!(0.004)),
            Err(DomainError::InvalidValue { .. })
        ));
        assert_eq!(validate_payment(dec!(100.00), dec!(0), dec!(99.990)).unwrap(), dec!(99.990));

        assert!(validate_money("total_amount", dec!(999999999999.99), BILL_AMOUNT_DIGITS).is_ok());
        assert!(validate_money("total_amount", dec!(1000000000000.00), BILL_AMOUNT_DIGITS).is_err());
    }

    #[test]
    fn test_new_bill_rules() {
        let mut new_bill = NewBill {
            vendor_id: Uuid::new_v4(),
            bill_number: "B-7".into(),
            bill_date: date(2026, 4, 10),
            due_date: Some(date(2026, 4, 9)),
            description: None,
            total_amount: dec!(99.50),
            attachment_url: None,
        };
        assert!(matches!(validate_new_bill(&new_bill), Err(DomainError::InvalidDateRange { .. })));
        new_bill.due_date = None;
        assert!(validate_new_bill(&new_bill).is_ok());
        new_bill.total_amount = dec!(10.125);
        assert!(matches!(validate_new_bill(&new_bill), Err(DomainError::InvalidValue { .. })));
        new_bill.total_amount = dec!(0);
        assert!(validate_new_bill(&new_bill).is_err());
    }

    #[test]
    fn test_payables_summary() {
        let today = date(2026, 6, 1);
        let bills = vec![
            bill(dec!(1000), dec!(1000), None),
            bill(dec!(500), dec!(200), Some(date(2026, 5, 1))),
            bill(dec!(250), dec!(0), None),
        ];
        let summary = summarize_payables(&bills, today);
        assert_eq!(summary.bill_count, 3);
        assert_eq!(summary.total_billed, dec!(1750));
        assert_eq!(summary.total_paid, dec!(1200));
        assert_eq!(summary.outstanding, dec!(550));
        assert_eq!(summary.overdue_count, 1);
    }

    #[test]
    fn test_status_text_round_trip() {
        assert_eq!("partially_paid".parse::<BillStatus>().unwrap(), BillStatus::PartiallyPaid);
        assert_eq!(PaymentMethod::BankTransfer.as_str(), "bank_transfer");
        assert!("wire".parse::<PaymentMethod>().is_err());
    }
}
