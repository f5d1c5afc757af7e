//! Back-office users and login sessions.
//!
//! Passwords arrive here already hashed and session tokens already digested;
//! this module never sees a plaintext credential.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use resortops_common::auth::{Role, User};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::UserRow;

const USER_COLUMNS: &str = "id, username, full_name, password_hash, role, is_active, created_at";

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Look up an active user together with the stored password hash.
    pub async fn find_for_login(&self, username: &str) -> Result<Option<(User, String)>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1) AND is_active"
        ))
        .bind(username.trim())
        .fetch_optional(self.db.pool())
        .await?
        .map(UserRow::into_user)
        .transpose()
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| DbError::NotFound(format!("user {id}")))?;
        Ok(row.into_user()?.0)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))
            .fetch_all(self.db.pool())
            .await?;
        rows.into_iter().map(|r| r.into_user().map(|(u, _)| u)).collect()
    }

    pub async fn insert(
        &self,
        username: &str,
        full_name: Option<&str>,
        password_hash: &str,
        role: Role,
    ) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(resortops_common::DomainError::Validation("username is required".into()).into());
        }
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, username, full_name, password_hash, role)
             VALUES ($1,$2,$3,$4,$5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(full_name)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(self.db.pool())
        .await?;

        tracing::info!(user_id = %row.id, username = %row.username, role = %role, "Created user");
        Ok(row.into_user()?.0)
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("user {id}")));
        }
        if !active {
            sqlx::query("DELETE FROM sessions WHERE user_id = $1")
                .bind(id)
                .execute(self.db.pool())
                .await?;
        }
        Ok(())
    }
}

/// Server-side sessions keyed by the SHA-256 digest of the cookie token.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<Database>,
}

impl SessionRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT INTO sessions (id, user_id, token_hash, expires_at) VALUES ($1,$2,$3,$4)")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// The active user owning an unexpired session, if any.
    pub async fn find_user(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.username, u.full_name, u.password_hash, u.role, u.is_active, u.created_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token_hash = $1 AND s.expires_at > $2 AND u.is_active",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(self.db.pool())
        .await?
        .map(|row| row.into_user().map(|(user, _)| user))
        .transpose()
    }

    pub async fn delete(&self, token_hash: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Remove expired sessions, returning how many were dropped.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() > 0 {
            tracing::debug!(removed = result.rows_affected(), "Purged expired sessions");
        }
        Ok(result.rows_affected())
    }
}
