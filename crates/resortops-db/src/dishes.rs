//! Dish (menu item) repository.

use std::sync::Arc;

use resortops_common::kitchen::{Dish, DishInput};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::DishRow;

const DISH_COLUMNS: &str = "id, name, category, price, cost_per_portion, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct DishRepository {
    db: Arc<Database>,
}

impl DishRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Dish>> {
        let rows = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes
             WHERE ($1 = FALSE OR is_active)
             ORDER BY category NULLS LAST, name"
        ))
        .bind(active_only)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(Dish::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Dish> {
        sqlx::query_as::<_, DishRow>(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .map(Dish::from)
            .ok_or_else(|| DbError::NotFound(format!("dish {id}")))
    }

    /// Fetch several dishes at once. Fails with `NotFound` naming the first
    /// id that does not exist.
    pub async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Dish>> {
        let rows = sqlx::query_as::<_, DishRow>(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(self.db.pool())
            .await?;
        let dishes: Vec<Dish> = rows.into_iter().map(Dish::from).collect();
        if let Some(missing) = ids.iter().find(|id| !dishes.iter().any(|d| d.id == **id)) {
            return Err(DbError::NotFound(format!("dish {missing}")));
        }
        Ok(dishes)
    }

    pub async fn insert(&self, input: &DishInput) -> Result<Dish> {
        input.validate()?;
        let row = sqlx::query_as::<_, DishRow>(&format!(
            "INSERT INTO dishes (id, name, category, price, cost_per_portion, is_active)
             VALUES ($1,$2,$3,$4,$5,$6)
             RETURNING {DISH_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(input.price)
        .bind(input.cost_per_portion)
        .bind(input.is_active)
        .fetch_one(self.db.pool())
        .await?;

        tracing::debug!(dish_id = %row.id, name = %row.name, "Inserted dish");
        Ok(row.into())
    }

    pub async fn update(&self, id: Uuid, input: &DishInput) -> Result<Dish> {
        input.validate()?;
        sqlx::query_as::<_, DishRow>(&format!(
            "UPDATE dishes SET
                name = $2, category = $3, price = $4, cost_per_portion = $5,
                is_active = $6, updated_at = now()
             WHERE id = $1
             RETURNING {DISH_COLUMNS}"
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(input.price)
        .bind(input.cost_per_portion)
        .bind(input.is_active)
        .fetch_optional(self.db.pool())
        .await?
        .map(Dish::from)
        .ok_or_else(|| DbError::NotFound(format!("dish {id}")))
    }
}
