//! CSV and PDF exports of bills, inventory, staff and revenue.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use resortops_common::ApiError;
use resortops_db::{BillFilter, StaffFilter};

use crate::auth::CurrentUser;
use crate::export::Table;
use crate::handlers::revenue::{summary_for, RevenueQuery};
use crate::state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Pdf,
}

/// Split `bills.csv` into report name and format.
pub fn parse_export(file: &str) -> Option<(&str, Format)> {
    let (report, ext) = file.rsplit_once('.')?;
    let format = match ext {
        "csv" => Format::Csv,
        "pdf" => Format::Pdf,
        _ => return None,
    };
    matches!(report, "bills" | "inventory" | "staff" | "revenue").then_some((report, format))
}

/// GET /api/exports/{report}.{csv|pdf}
pub async fn export(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(file): Path<String>,
    Query(range): Query<RevenueQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (report, format) =
        parse_export(&file).ok_or_else(|| ApiError::NotFound(format!("no export named {file}")))?;

    let table = match report {
        "bills" => bills_table(&state).await?,
        "inventory" => inventory_table(&state).await?,
        "staff" => {
            user.require_manager()?;
            staff_table(&state).await?
        }
        _ => revenue_table(&state, &range).await?,
    };

    let generated = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let (body, content_type) = match format {
        Format::Csv => (table.to_csv()?, "text/csv; charset=utf-8"),
        Format::Pdf => (table.to_pdf(&state.config.property.name, &generated)?, "application/pdf"),
    };

    tracing::info!(report, rows = table.rows.len(), by = %user.0.username, "Exported report");
    let disposition = format!("attachment; filename=\"{file}\"");
    Ok(([(header::CONTENT_TYPE, content_type.to_string()), (header::CONTENT_DISPOSITION, disposition)], body))
}

async fn bills_table(state: &SharedState) -> Result<Table, ApiError> {
    let vendors = state.vendors().list(false, None).await?;
    let bills = state.bills().list(&BillFilter::default()).await?;

    let mut table = Table::new(
        "Vendor bills",
        &["Vendor", "Bill no.", "Bill date", "Due date", "Total", "Paid", "Balance", "Status"],
    );
    for bill in bills {
        let vendor = vendors
            .iter()
            .find(|v| v.id == bill.vendor_id)
            .map(|v| v.name.clone())
            .unwrap_or_default();
        table.push(vec![
            vendor,
            bill.bill_number.clone(),
            bill.bill_date.to_string(),
            bill.due_date.map(|d| d.to_string()).unwrap_or_default(),
            bill.total_amount.to_string(),
            bill.paid_amount.to_string(),
            bill.balance().to_string(),
            bill.status.to_string(),
        ]);
    }
    Ok(table)
}

async fn inventory_table(state: &SharedState) -> Result<Table, ApiError> {
    let items = state.inventory().list(None).await?;
    let mut table = Table::new("Inventory", &["Item", "Category", "Unit", "Quantity", "Threshold", "Value", "Status"]);
    for item in items {
        table.push(vec![
            item.name.clone(),
            item.category.clone().unwrap_or_default(),
            item.unit.clone(),
            format!("{:.2}", item.quantity),
            format!("{:.2}", item.min_threshold),
            format!("{:.2}", item.value()),
            item.status().to_string(),
        ]);
    }
    Ok(table)
}

async fn staff_table(state: &SharedState) -> Result<Table, ApiError> {
    let staff = state.staff().list(&StaffFilter::default()).await?;
    let mut table = Table::new(
        "Staff directory",
        &["Code", "Name", "Department", "Designation", "Joined", "Salary", "Status"],
    );
    for s in staff {
        table.push(vec![
            s.employee_code,
            s.full_name,
            s.department,
            s.designation.unwrap_or_default(),
            s.joining_date.to_string(),
            s.monthly_salary.to_string(),
            s.status.to_string(),
        ]);
    }
    Ok(table)
}

async fn revenue_table(state: &SharedState, range: &RevenueQuery) -> Result<Table, ApiError> {
    let summary = summary_for(state, range).await?;
    let mut table = Table::new(
        format!(
            "Revenue {} to {}: {} over {} tickets",
            summary.from, summary.to, summary.total_revenue, summary.tickets
        ),
        &["Date", "Tickets", "Revenue"],
    );
    for day in &summary.daily {
        table.push(vec![day.date.to_string(), day.tickets.to_string(), day.revenue.to_string()]);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export() {
        assert_eq!(parse_export("bills.csv"), Some(("bills", Format::Csv)));
        assert_eq!(parse_export("revenue.pdf"), Some(("revenue", Format::Pdf)));
        assert_eq!(parse_export("bills.xlsx"), None);
        assert_eq!(parse_export("payroll.csv"), None);
        assert_eq!(parse_export("bills"), None);
    }
}
