//! Connection pool and migrations.

use std::time::Duration;

use resortops_config::DatabaseConfig;
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::Result;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Main database handle.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect eagerly, failing fast when PostgreSQL is unreachable.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self> {
        let pool = Self::pool_options(cfg).connect(&cfg.url).await?;
        tracing::info!(max_connections = cfg.max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Build a pool that only connects on first use.
    pub fn connect_lazy(cfg: &DatabaseConfig) -> Result<Self> {
        let pool = Self::pool_options(cfg).connect_lazy(&cfg.url)?;
        Ok(Self { pool })
    }

    fn pool_options(cfg: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Headline numbers for the dashboard.
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let stats = sqlx::query_as::<_, DatabaseStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM vendors WHERE is_active)                         AS vendors,
                (SELECT COUNT(*) FROM vendor_bills WHERE paid_amount < total_amount)  AS open_bills,
                (SELECT COALESCE(SUM(total_amount - paid_amount), 0) FROM vendor_bills) AS outstanding,
                (SELECT COUNT(*) FROM staff WHERE status <> 'inactive')                AS active_staff,
                (SELECT COUNT(*) FROM inventory_items WHERE quantity <= min_threshold) AS low_stock_items,
                (SELECT COUNT(*) FROM leave_requests WHERE status = 'pending')         AS pending_leave,
                (SELECT COUNT(*) FROM dishes WHERE is_active)                          AS active_dishes
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

/// Database statistics.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct DatabaseStats {
    pub vendors: i64,
    pub open_bills: i64,
    pub outstanding: rust_decimal::Decimal,
    pub active_staff: i64,
    pub low_stock_items: i64,
    pub pending_leave: i64,
    pub active_dishes: i64,
}
