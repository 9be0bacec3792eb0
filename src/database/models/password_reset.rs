use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, MySqlPool};

use crate::auth::Role;
use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: i64,
    pub account_role: String,
    pub account_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub async fn invalidate_for_account<'e, E>(executor: E, role: Role, account_id: i64) -> Result<(), DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query(
        "UPDATE password_resets SET used_at = CURRENT_TIMESTAMP
         WHERE account_role = ? AND account_id = ? AND used_at IS NULL",
    )
    .bind(role.as_str())
    .bind(account_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert<'e, E>(
    executor: E,
    role: Role,
    account_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<i64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        "INSERT INTO password_resets (account_role, account_id, token_hash, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(role.as_str())
    .bind(account_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(executor)
    .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn find_by_hash(pool: &MySqlPool, token_hash: &str) -> Result<Option<PasswordReset>, DatabaseError> {
    Ok(sqlx::query_as::<_, PasswordReset>(
        "SELECT id, account_role, account_id, token_hash, expires_at, used_at, created_at
         FROM password_resets WHERE token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?)
}

/// Returns false when the token was already used
pub async fn mark_used<'e, E>(executor: E, id: i64) -> Result<bool, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query("UPDATE password_resets SET used_at = CURRENT_TIMESTAMP WHERE id = ? AND used_at IS NULL")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
