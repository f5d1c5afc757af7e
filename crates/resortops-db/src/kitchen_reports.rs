//! Daily kitchen production reports.
//!
//! Each line snapshots the dish name and cost per portion at the time the
//! report is filed, so later menu edits do not rewrite past wastage figures.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use resortops_common::kitchen::{validate_report, KitchenReport, KitchenReportLine, NewKitchenReport};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{DishRow, ReportLineRow, ReportRow};

const REPORT_COLUMNS: &str = "id, report_date, shift, prepared_by, notes, created_at";
const LINE_COLUMNS: &str = "report_id, dish_id, dish_name, prepared_qty, sold_qty, cost_per_portion";

#[derive(Clone)]
pub struct KitchenReportRepository {
    db: Arc<Database>,
}

impl KitchenReportRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn insert(&self, report: &NewKitchenReport, created_by: Option<Uuid>) -> Result<KitchenReport> {
        validate_report(report)?;

        let mut tx = self.db.pool().begin().await?;

        let dish_ids: Vec<Uuid> = report.lines.iter().map(|l| l.dish_id).collect();
        let dishes: HashMap<Uuid, DishRow> = sqlx::query_as::<_, DishRow>(
            "SELECT id, name, category, price, cost_per_portion, is_active, created_at, updated_at
             FROM dishes WHERE id = ANY($1)",
        )
        .bind(&dish_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();

        let header = sqlx::query_as::<_, ReportRow>(&format!(
            "INSERT INTO kitchen_reports (id, report_date, shift, prepared_by, notes, created_by)
             VALUES ($1,$2,$3,$4,$5,$6)
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(report.report_date)
        .bind(report.shift.as_deref().map(str::trim).filter(|s| !s.is_empty()))
        .bind(&report.prepared_by)
        .bind(&report.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(report.lines.len());
        for line in &report.lines {
            let dish = dishes
                .get(&line.dish_id)
                .ok_or_else(|| DbError::NotFound(format!("dish {}", line.dish_id)))?;
            let row = sqlx::query_as::<_, ReportLineRow>(&format!(
                "INSERT INTO kitchen_report_lines
                    (report_id, dish_id, dish_name, prepared_qty, sold_qty, cost_per_portion)
                 VALUES ($1,$2,$3,$4,$5,$6)
                 RETURNING {LINE_COLUMNS}"
            ))
            .bind(header.id)
            .bind(dish.id)
            .bind(&dish.name)
            .bind(line.prepared_qty)
            .bind(line.sold_qty)
            .bind(dish.cost_per_portion)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(KitchenReportLine::from(row));
        }

        tx.commit().await?;

        tracing::info!(
            report_id = %header.id,
            date = %header.report_date,
            dishes = lines.len(),
            "Filed kitchen report"
        );
        Ok(assemble(header, lines))
    }

    pub async fn get(&self, id: Uuid) -> Result<KitchenReport> {
        let header = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM kitchen_reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| DbError::NotFound(format!("kitchen report {id}")))?;

        let lines = self.lines_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(assemble(header, lines))
    }

    /// Reports dated within `[from, to]`, newest first.
    pub async fn list(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<KitchenReport>> {
        let headers = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM kitchen_reports
             WHERE ($1::DATE IS NULL OR report_date >= $1)
               AND ($2::DATE IS NULL OR report_date <= $2)
             ORDER BY report_date DESC, shift NULLS FIRST"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(self.db.pool())
        .await?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let mut lines = self.lines_for(&ids).await?;
        Ok(headers
            .into_iter()
            .map(|h| {
                let report_lines = lines.remove(&h.id).unwrap_or_default();
                assemble(h, report_lines)
            })
            .collect())
    }

    async fn lines_for(&self, report_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<KitchenReportLine>>> {
        if report_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, ReportLineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM kitchen_report_lines
             WHERE report_id = ANY($1)
             ORDER BY dish_name"
        ))
        .bind(report_ids)
        .fetch_all(self.db.pool())
        .await?;

        let mut grouped: HashMap<Uuid, Vec<KitchenReportLine>> = HashMap::new();
        for row in rows {
            grouped.entry(row.report_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

fn assemble(header: ReportRow, lines: Vec<KitchenReportLine>) -> KitchenReport {
    KitchenReport {
        id: header.id,
        report_date: header.report_date,
        shift: header.shift,
        prepared_by: header.prepared_by,
        notes: header.notes,
        lines,
        created_at: header.created_at,
    }
}
