//! Vendor bill and payment repository.
//!
//! `paid_amount` on a bill is the running sum of its payments. It is only
//! changed inside [`BillRepository::record_payment`], which locks the bill
//! row so concurrent payments cannot push the balance below zero.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use resortops_common::billing::{
    bill_status, validate_new_bill, validate_payment, BillPayment, BillStatus, NewBill, NewPayment,
    VendorBill,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{BillRow, PaymentRow};

const BILL_COLUMNS: &str = "id, vendor_id, bill_number, bill_date, due_date, description, \
     total_amount, paid_amount, status, attachment_url, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, bill_id, amount, method, paid_on, reference, note, created_at";

#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    pub vendor_id: Option<Uuid>,
    pub status: Option<BillStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Repository for vendor bills.
#[derive(Clone)]
pub struct BillRepository {
    db: Arc<Database>,
}

impl BillRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// List bills, newest first. Status is re-derived against today's date so
    /// that bills past their due date show up as overdue.
    pub async fn list(&self, filter: &BillFilter) -> Result<Vec<VendorBill>> {
        let rows = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {BILL_COLUMNS} FROM vendor_bills
             WHERE ($1::UUID IS NULL OR vendor_id = $1)
               AND ($2::DATE IS NULL OR bill_date >= $2)
               AND ($3::DATE IS NULL OR bill_date <= $3)
             ORDER BY bill_date DESC, bill_number"
        ))
        .bind(filter.vendor_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(self.db.pool())
        .await?;

        let today = Utc::now().date_naive();
        let mut bills = Vec::with_capacity(rows.len());
        for row in rows {
            let bill = refresh(VendorBill::try_from(row)?, today);
            if filter.status.map_or(true, |s| s == bill.status) {
                bills.push(bill);
            }
        }
        Ok(bills)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VendorBill>> {
        let row = sqlx::query_as::<_, BillRow>(&format!("SELECT {BILL_COLUMNS} FROM vendor_bills WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        row.map(|r| Ok(refresh(VendorBill::try_from(r)?, Utc::now().date_naive())))
            .transpose()
    }

    pub async fn get(&self, id: Uuid) -> Result<VendorBill> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("bill {id}")))
    }

    pub async fn insert(&self, bill: &NewBill) -> Result<VendorBill> {
        validate_new_bill(bill)?;
        let status = bill_status(bill.total_amount, Decimal::ZERO, bill.due_date, Utc::now().date_naive());

        let row = sqlx::query_as::<_, BillRow>(&format!(
            "INSERT INTO vendor_bills
                (id, vendor_id, bill_number, bill_date, due_date, description,
                 total_amount, paid_amount, status, attachment_url)
             VALUES ($1,$2,$3,$4,$5,$6,$7,0,$8,$9)
             RETURNING {BILL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(bill.vendor_id)
        .bind(bill.bill_number.trim())
        .bind(bill.bill_date)
        .bind(bill.due_date)
        .bind(&bill.description)
        .bind(bill.total_amount)
        .bind(status.as_str())
        .bind(&bill.attachment_url)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Referenced(_) => DbError::NotFound(format!("vendor {}", bill.vendor_id)),
            other => other,
        })?;

        tracing::debug!(bill_id = %row.id, vendor_id = %row.vendor_id, total = %row.total_amount, "Inserted vendor bill");
        row.try_into()
    }

    pub async fn payments(&self, bill_id: Uuid) -> Result<Vec<BillPayment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM bill_payments WHERE bill_id = $1 ORDER BY paid_on, created_at"
        ))
        .bind(bill_id)
        .fetch_all(self.db.pool())
        .await?;
        rows.into_iter().map(BillPayment::try_from).collect()
    }

    /// Record a payment against a bill and return the updated bill.
    pub async fn record_payment(
        &self,
        bill_id: Uuid,
        payment: &NewPayment,
        recorded_by: Option<Uuid>,
    ) -> Result<(VendorBill, BillPayment)> {
        let mut tx = self.db.pool().begin().await?;

        let current = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {BILL_COLUMNS} FROM vendor_bills WHERE id = $1 FOR UPDATE"
        ))
        .bind(bill_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("bill {bill_id}")))?;

        let new_paid = validate_payment(current.total_amount, current.paid_amount, payment.amount)?;
        let status = bill_status(current.total_amount, new_paid, current.due_date, Utc::now().date_naive());

        let payment_row = sqlx::query_as::<_, PaymentRow>(&format!(
            "INSERT INTO bill_payments (id, bill_id, amount, method, paid_on, reference, note, created_by)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(bill_id)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(payment.paid_on)
        .bind(&payment.reference)
        .bind(&payment.note)
        .bind(recorded_by)
        .fetch_one(&mut *tx)
        .await?;

        let bill_row = sqlx::query_as::<_, BillRow>(&format!(
            "UPDATE vendor_bills SET paid_amount = $2, status = $3, updated_at = now()
             WHERE id = $1
             RETURNING {BILL_COLUMNS}"
        ))
        .bind(bill_id)
        .bind(new_paid)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            bill_id = %bill_id,
            amount = %payment.amount,
            balance = %(bill_row.total_amount - bill_row.paid_amount),
            "Recorded bill payment"
        );
        let bill = refresh(VendorBill::try_from(bill_row)?, Utc::now().date_naive());
        Ok((bill, payment_row.try_into()?))
    }

    pub async fn set_attachment(&self, bill_id: Uuid, url: &str) -> Result<()> {
        let result = sqlx::query("UPDATE vendor_bills SET attachment_url = $2, updated_at = now() WHERE id = $1")
            .bind(bill_id)
            .bind(url)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("bill {bill_id}")));
        }
        Ok(())
    }
}

fn refresh(mut bill: VendorBill, today: NaiveDate) -> VendorBill {
    bill.status = bill_status(bill.total_amount, bill.paid_amount, bill.due_date, today);
    bill
}
