//! Kitchen order tickets.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use resortops_common::revenue::{Kot, KotLine, NewKot};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{DishRow, KotLineRow, KotRow};

const KOT_COLUMNS: &str = "id, kot_number, outlet, table_no, served_at, created_at";

#[derive(Clone)]
pub struct KotRepository {
    db: Arc<Database>,
}

impl KotRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a ticket. Lines without an explicit price are charged at the
    /// dish's current list price.
    pub async fn insert(&self, kot: &NewKot, created_by: Option<Uuid>) -> Result<Kot> {
        kot.validate()?;

        let mut tx = self.db.pool().begin().await?;

        let dish_ids: Vec<Uuid> = kot.lines.iter().map(|l| l.dish_id).collect();
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

        let header = sqlx::query_as::<_, KotRow>(&format!(
            "INSERT INTO kots (id, kot_number, outlet, table_no, served_at, created_by)
             VALUES ($1,$2,$3,$4,$5,$6)
             RETURNING {KOT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(kot.kot_number.trim())
        .bind(kot.outlet.trim())
        .bind(&kot.table_no)
        .bind(kot.served_at.unwrap_or_else(Utc::now))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(kot.lines.len());
        for (line_no, line) in kot.lines.iter().enumerate() {
            let dish = dishes
                .get(&line.dish_id)
                .ok_or_else(|| DbError::NotFound(format!("dish {}", line.dish_id)))?;
            let unit_price = line.unit_price.unwrap_or(dish.price);
            sqlx::query(
                "INSERT INTO kot_lines (kot_id, line_no, dish_id, dish_name, quantity, unit_price)
                 VALUES ($1,$2,$3,$4,$5,$6)",
            )
            .bind(header.id)
            .bind(line_no as i32 + 1)
            .bind(dish.id)
            .bind(&dish.name)
            .bind(line.quantity)
            .bind(unit_price)
            .execute(&mut *tx)
            .await?;
            lines.push(KotLine {
                dish_id: dish.id,
                dish_name: dish.name.clone(),
                quantity: line.quantity,
                unit_price,
            });
        }

        tx.commit().await?;

        let kot = assemble(header, lines);
        tracing::debug!(kot_id = %kot.id, kot_number = %kot.kot_number, total = %kot.total(), "Recorded KOT");
        Ok(kot)
    }

    /// Tickets served within `[from, to)`, oldest first.
    pub async fn list_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Kot>> {
        let headers = sqlx::query_as::<_, KotRow>(&format!(
            "SELECT {KOT_COLUMNS} FROM kots
             WHERE served_at >= $1 AND served_at < $2
             ORDER BY served_at, kot_number"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(self.db.pool())
        .await?;

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let rows = sqlx::query_as::<_, KotLineRow>(
            "SELECT kot_id, dish_id, dish_name, quantity, unit_price
             FROM kot_lines WHERE kot_id = ANY($1)
             ORDER BY kot_id, line_no",
        )
        .bind(&ids)
        .fetch_all(self.db.pool())
        .await?;

        let mut grouped: HashMap<Uuid, Vec<KotLine>> = HashMap::new();
        for row in rows {
            grouped.entry(row.kot_id).or_default().push(row.into());
        }

        Ok(headers
            .into_iter()
            .map(|h| {
                let lines = grouped.remove(&h.id).unwrap_or_default();
                assemble(h, lines)
            })
            .collect())
    }
}

fn assemble(header: KotRow, lines: Vec<KotLine>) -> Kot {
    Kot {
        id: header.id,
        kot_number: header.kot_number,
        outlet: header.outlet,
        table_no: header.table_no,
        served_at: header.served_at,
        lines,
        created_at: header.created_at,
    }
}
