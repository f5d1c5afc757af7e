//! Database error types.

use resortops_common::{ApiError, DomainError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Still referenced: {0}")]
    Referenced(String),

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Invalid value {value:?} in column {column}")]
    Corrupt { column: &'static str, value: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound("row not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(db_err.constraint().unwrap_or("unique constraint").to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::Referenced(db_err.constraint().unwrap_or("foreign key").to_string())
            }
            _ => DbError::Sqlx(err),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => ApiError::NotFound(what),
            DbError::Duplicate(what) => ApiError::Conflict(format!("Duplicate entry ({what})")),
            DbError::Referenced(what) => {
                ApiError::Conflict(format!("Record is still referenced by other records ({what})"))
            }
            DbError::Forbidden(what) => ApiError::Forbidden(what),
            DbError::Domain(domain) => domain.into(),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound(_)));
        let api: ApiError = err.into();
        assert_eq!(api.status().as_u16(), 404);
    }

    #[test]
    fn test_domain_errors_pass_through() {
        let err = DbError::Domain(DomainError::Validation("bad".into()));
        let api: ApiError = err.into();
        assert_eq!(api.status().as_u16(), 400);
    }
}
