//! Vendor repository.

use std::sync::Arc;

use resortops_common::billing::{Vendor, VendorInput};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::VendorRow;

const VENDOR_COLUMNS: &str =
    "id, name, contact_person, phone, email, gstin, address, category, is_active, created_at, updated_at";

/// Repository for vendor operations.
#[derive(Clone)]
pub struct VendorRepository {
    db: Arc<Database>,
}

impl VendorRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// List vendors by name, optionally only active ones or those whose name
    /// contains `search`.
    pub async fn list(&self, active_only: bool, search: Option<&str>) -> Result<Vec<Vendor>> {
        let pattern = search.map(|s| format!("%{}%", s.trim().to_lowercase()));
        let rows = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors
             WHERE ($1 = FALSE OR is_active)
               AND ($2::TEXT IS NULL OR LOWER(name) LIKE $2)
             ORDER BY name"
        ))
        .bind(active_only)
        .bind(pattern)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(Vendor::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>> {
        let row = sqlx::query_as::<_, VendorRow>(&format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(Vendor::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<Vendor> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("vendor {id}")))
    }

    pub async fn insert(&self, input: &VendorInput) -> Result<Vendor> {
        input.validate()?;
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "INSERT INTO vendors (id, name, contact_person, phone, email, gstin, address, category, is_active)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
             RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.gstin)
        .bind(&input.address)
        .bind(&input.category)
        .bind(input.is_active)
        .fetch_one(self.db.pool())
        .await?;

        tracing::debug!(vendor_id = %row.id, name = %row.name, "Inserted vendor");
        Ok(row.into())
    }

    pub async fn update(&self, id: Uuid, input: &VendorInput) -> Result<Vendor> {
        input.validate()?;
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "UPDATE vendors SET
                name = $2, contact_person = $3, phone = $4, email = $5, gstin = $6,
                address = $7, category = $8, is_active = $9, updated_at = now()
             WHERE id = $1
             RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.gstin)
        .bind(&input.address)
        .bind(&input.category)
        .bind(input.is_active)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| DbError::NotFound(format!("vendor {id}")))?;
        Ok(row.into())
    }

    /// Delete a vendor. Vendors with bills cannot be deleted; deactivate
    /// them instead.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("vendor {id}")));
        }
        Ok(())
    }
}
