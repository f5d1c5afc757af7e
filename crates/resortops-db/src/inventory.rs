//! Inventory item and stock movement repository.

use std::sync::Arc;

use resortops_common::inventory::{apply_movement, InventoryItem, ItemInput, StockAdjustment, StockMovement};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{ItemRow, MovementRow};

const ITEM_COLUMNS: &str =
    "id, name, category, unit, quantity, min_threshold, unit_cost, vendor_id, created_at, updated_at";

const MOVEMENT_COLUMNS: &str = "id, item_id, kind, quantity, quantity_after, reason, performed_by, created_at";

/// Repository for inventory items.
#[derive(Clone)]
pub struct InventoryRepository {
    db: Arc<Database>,
    default_threshold: f64,
}

impl InventoryRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db, default_threshold: 0.0 }
    }

    /// Threshold applied to new items that do not specify one.
    pub fn with_default_threshold(mut self, threshold: f64) -> Self {
        self.default_threshold = threshold;
        self
    }

    pub async fn list(&self, category: Option<&str>) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items
             WHERE ($1::TEXT IS NULL OR LOWER(category) = LOWER($1))
             ORDER BY category NULLS LAST, name"
        ))
        .bind(category)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(InventoryItem::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<InventoryItem> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("inventory item {id}")))
    }

    pub async fn insert(&self, input: &ItemInput) -> Result<InventoryItem> {
        input.validate()?;
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO inventory_items (id, name, category, unit, quantity, min_threshold, unit_cost, vendor_id)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(input.unit.trim())
        .bind(input.quantity)
        .bind(input.min_threshold.unwrap_or(self.default_threshold))
        .bind(input.unit_cost)
        .bind(input.vendor_id)
        .fetch_one(self.db.pool())
        .await?;

        tracing::debug!(item_id = %row.id, name = %row.name, quantity = row.quantity, "Inserted inventory item");
        Ok(row.into())
    }

    /// Update item metadata. Quantity only changes through [`Self::adjust_stock`]
    /// so every change is logged as a movement.
    pub async fn update(&self, id: Uuid, input: &ItemInput) -> Result<InventoryItem> {
        input.validate()?;
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE inventory_items SET
                name = $2, category = $3, unit = $4,
                min_threshold = COALESCE($5, min_threshold),
                unit_cost = $6, vendor_id = $7, updated_at = now()
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(input.unit.trim())
        .bind(input.min_threshold)
        .bind(input.unit_cost)
        .bind(input.vendor_id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| DbError::NotFound(format!("inventory item {id}")))?;
        Ok(row.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("inventory item {id}")));
        }
        Ok(())
    }

    /// Add or remove stock and log the movement, atomically.
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        adjustment: &StockAdjustment,
        performed_by: Option<Uuid>,
    ) -> Result<(InventoryItem, StockMovement)> {
        let mut tx = self.db.pool().begin().await?;

        let current = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("inventory item {id}")))?;

        let new_quantity = apply_movement(&current.name, current.quantity, adjustment.kind, adjustment.quantity)?;

        let item = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE inventory_items SET quantity = $2, updated_at = now()
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(new_quantity)
        .fetch_one(&mut *tx)
        .await?;

        let movement = sqlx::query_as::<_, MovementRow>(&format!(
            "INSERT INTO stock_movements (id, item_id, kind, quantity, quantity_after, reason, performed_by)
             VALUES ($1,$2,$3,$4,$5,$6,$7)
             RETURNING {MOVEMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(adjustment.kind.as_str())
        .bind(adjustment.quantity)
        .bind(new_quantity)
        .bind(&adjustment.reason)
        .bind(performed_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            item_id = %id,
            kind = %adjustment.kind,
            quantity = adjustment.quantity,
            quantity_after = new_quantity,
            "Adjusted stock"
        );
        Ok((item.into(), movement.try_into()?))
    }

    pub async fn movements(&self, item_id: Uuid, limit: i64) -> Result<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements
             WHERE item_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        ))
        .bind(item_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;
        rows.into_iter().map(StockMovement::try_from).collect()
    }
}
