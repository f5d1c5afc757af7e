//! Row types as stored in PostgreSQL and their conversion into domain types.
//!
//! Enum-like columns are TEXT; a value that no longer parses surfaces as
//! [`DbError::Corrupt`] instead of being silently defaulted.

use chrono::{DateTime, NaiveDate, Utc};
use resortops_common::auth::User;
use resortops_common::billing::{BillPayment, Vendor, VendorBill};
use resortops_common::inventory::{InventoryItem, StockMovement};
use resortops_common::kitchen::{Dish, KitchenReportLine};
use resortops_common::leave::LeaveRequest;
use resortops_common::revenue::KotLine;
use resortops_common::staff::Staff;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{DbError, Result};

pub(crate) fn parse_column<T>(column: &'static str, value: &str) -> Result<T>
where
    T: FromStr,
{
    value
        .parse()
        .map_err(|_| DbError::Corrupt { column, value: value.to_string() })
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> Result<(User, String)> {
        let user = User {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            role: parse_column("users.role", &self.role)?,
            is_active: self.is_active,
            created_at: self.created_at,
        };
        Ok((user, self.password_hash))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VendorRow {
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

impl From<VendorRow> for Vendor {
    fn from(r: VendorRow) -> Self {
        Vendor {
            id: r.id,
            name: r.name,
            contact_person: r.contact_person,
            phone: r.phone,
            email: r.email,
            gstin: r.gstin,
            address: r.address,
            category: r.category,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BillRow {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub bill_number: String,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: String,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BillRow> for VendorBill {
    type Error = DbError;

    fn try_from(r: BillRow) -> Result<Self> {
        Ok(VendorBill {
            status: parse_column("vendor_bills.status", &r.status)?,
            id: r.id,
            vendor_id: r.vendor_id,
            bill_number: r.bill_number,
            bill_date: r.bill_date,
            due_date: r.due_date,
            description: r.description,
            total_amount: r.total_amount,
            paid_amount: r.paid_amount,
            attachment_url: r.attachment_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub paid_on: NaiveDate,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for BillPayment {
    type Error = DbError;

    fn try_from(r: PaymentRow) -> Result<Self> {
        Ok(BillPayment {
            method: parse_column("bill_payments.method", &r.method)?,
            id: r.id,
            bill_id: r.bill_id,
            amount: r.amount,
            paid_on: r.paid_on,
            reference: r.reference,
            note: r.note,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StaffRow {
    pub id: Uuid,
    pub employee_code: String,
    pub full_name: String,
    pub department: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub joining_date: NaiveDate,
    pub monthly_salary: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StaffRow> for Staff {
    type Error = DbError;

    fn try_from(r: StaffRow) -> Result<Self> {
        Ok(Staff {
            status: parse_column("staff.status", &r.status)?,
            id: r.id,
            employee_code: r.employee_code,
            full_name: r.full_name,
            department: r.department,
            designation: r.designation,
            phone: r.phone,
            email: r.email,
            joining_date: r.joining_date,
            monthly_salary: r.monthly_salary,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub quantity: f64,
    pub min_threshold: f64,
    pub unit_cost: Option<f64>,
    pub vendor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemRow> for InventoryItem {
    fn from(r: ItemRow) -> Self {
        InventoryItem {
            id: r.id,
            name: r.name,
            category: r.category,
            unit: r.unit,
            quantity: r.quantity,
            min_threshold: r.min_threshold,
            unit_cost: r.unit_cost,
            vendor_id: r.vendor_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MovementRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub kind: String,
    pub quantity: f64,
    pub quantity_after: f64,
    pub reason: Option<String>,
    pub performed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = DbError;

    fn try_from(r: MovementRow) -> Result<Self> {
        Ok(StockMovement {
            kind: parse_column("stock_movements.kind", &r.kind)?,
            id: r.id,
            item_id: r.item_id,
            quantity: r.quantity,
            quantity_after: r.quantity_after,
            reason: r.reason,
            performed_by: r.performed_by,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DishRow {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub cost_per_portion: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DishRow> for Dish {
    fn from(r: DishRow) -> Self {
        Dish {
            id: r.id,
            name: r.name,
            category: r.category,
            price: r.price,
            cost_per_portion: r.cost_per_portion,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReportRow {
    pub id: Uuid,
    pub report_date: NaiveDate,
    pub shift: Option<String>,
    pub prepared_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReportLineRow {
    pub report_id: Uuid,
    pub dish_id: Uuid,
    pub dish_name: String,
    pub prepared_qty: i32,
    pub sold_qty: i32,
    pub cost_per_portion: Decimal,
}

impl From<ReportLineRow> for KitchenReportLine {
    fn from(r: ReportLineRow) -> Self {
        KitchenReportLine {
            dish_id: r.dish_id,
            dish_name: r.dish_name,
            prepared_qty: r.prepared_qty,
            sold_qty: r.sold_qty,
            cost_per_portion: r.cost_per_portion,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LeaveRow {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: f64,
    pub covered_days: f64,
    pub lop_days: f64,
    pub reason: Option<String>,
    pub status: String,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = DbError;

    fn try_from(r: LeaveRow) -> Result<Self> {
        Ok(LeaveRequest {
            leave_type: parse_column("leave_requests.leave_type", &r.leave_type)?,
            status: parse_column("leave_requests.status", &r.status)?,
            id: r.id,
            staff_id: r.staff_id,
            start_date: r.start_date,
            end_date: r.end_date,
            days: r.days,
            covered_days: r.covered_days,
            lop_days: r.lop_days,
            reason: r.reason,
            decided_by: r.decided_by,
            decided_at: r.decided_at,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct KotRow {
    pub id: Uuid,
    pub kot_number: String,
    pub outlet: String,
    pub table_no: Option<String>,
    pub served_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct KotLineRow {
    pub kot_id: Uuid,
    pub dish_id: Uuid,
    pub dish_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl From<KotLineRow> for KotLine {
    fn from(r: KotLineRow) -> Self {
        KotLine { dish_id: r.dish_id, dish_name: r.dish_name, quantity: r.quantity, unit_price: r.unit_price }
    }
}

/// A file uploaded to Google Drive and linked to a back-office record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub drive_file_id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size_bytes: i64,
    pub web_view_link: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use resortops_common::billing::BillStatus;

    #[test]
    fn test_bill_row_parses_status() {
        let row = BillRow {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            bill_number: "GRN-11".into(),
            bill_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            due_date: None,
            description: None,
            total_amount: Decimal::from(10),
            paid_amount: Decimal::ZERO,
            status: "unpaid".into(),
            attachment_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let bill = VendorBill::try_from(row).unwrap();
        assert_eq!(bill.status, BillStatus::Unpaid);
    }

    #[test]
    fn test_unknown_enum_value_is_corrupt() {
        let err = parse_column::<BillStatus>("vendor_bills.status", "settled").unwrap_err();
        assert!(matches!(err, DbError::Corrupt { column: "vendor_bills.status", .. }));
    }
}
