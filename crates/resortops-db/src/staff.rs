//! Staff repository.

use std::sync::Arc;

use resortops_common::staff::{Staff, StaffInput, StaffStatus};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::StaffRow;

const STAFF_COLUMNS: &str = "id, employee_code, full_name, department, designation, phone, email, \
     joining_date, monthly_salary, status, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    pub department: Option<String>,
    pub status: Option<StaffStatus>,
}

/// Repository for staff records.
#[derive(Clone)]
pub struct StaffRepository {
    db: Arc<Database>,
}

impl StaffRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &StaffFilter) -> Result<Vec<Staff>> {
        let rows = sqlx::query_as::<_, StaffRow>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff
             WHERE ($1::TEXT IS NULL OR LOWER(department) = LOWER($1))
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY department, full_name"
        ))
        .bind(&filter.department)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(self.db.pool())
        .await?;
        rows.into_iter().map(Staff::try_from).collect()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Staff>> {
        let row = sqlx::query_as::<_, StaffRow>(&format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        row.map(Staff::try_from).transpose()
    }

    pub async fn get(&self, id: Uuid) -> Result<Staff> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("staff member {id}")))
    }

    pub async fn insert(&self, input: &StaffInput) -> Result<Staff> {
        input.validate()?;
        let row = sqlx::query_as::<_, StaffRow>(&format!(
            "INSERT INTO staff
                (id, employee_code, full_name, department, designation, phone, email,
                 joining_date, monthly_salary, status)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
             RETURNING {STAFF_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.employee_code.trim())
        .bind(input.full_name.trim())
        .bind(input.department.trim())
        .bind(&input.designation)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.joining_date)
        .bind(input.monthly_salary)
        .bind(input.status.as_str())
        .fetch_one(self.db.pool())
        .await?;

        tracing::debug!(staff_id = %row.id, code = %row.employee_code, "Inserted staff member");
        row.try_into()
    }

    pub async fn update(&self, id: Uuid, input: &StaffInput) -> Result<Staff> {
        input.validate()?;
        let row = sqlx::query_as::<_, StaffRow>(&format!(
            "UPDATE staff SET
                employee_code = $2, full_name = $3, department = $4, designation = $5,
                phone = $6, email = $7, joining_date = $8, monthly_salary = $9,
                status = $10, updated_at = now()
             WHERE id = $1
             RETURNING {STAFF_COLUMNS}"
        ))
        .bind(id)
        .bind(input.employee_code.trim())
        .bind(input.full_name.trim())
        .bind(input.department.trim())
        .bind(&input.designation)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.joining_date)
        .bind(input.monthly_salary)
        .bind(input.status.as_str())
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| DbError::NotFound(format!("staff member {id}")))?;
        row.try_into()
    }

    pub async fn set_status(&self, id: Uuid, status: StaffStatus) -> Result<()> {
        let result = sqlx::query("UPDATE staff SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("staff member {id}")));
        }
        Ok(())
    }
}
