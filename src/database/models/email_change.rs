use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, MySqlPool};

use crate::auth::Role;
use crate::database::manager::DatabaseError;

/// Pending email-change confirmation. `otp_hash` is the SHA-256 of the code.
#[derive(Debug, Clone, FromRow)]
pub struct EmailChangeRequest {
    pub id: i64,
    pub account_role: String,
    pub account_id: i64,
    pub new_email: String,
    pub otp_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, account_role, account_id, new_email, otp_hash, attempts, expires_at, consumed_at, created_at";

/// Mark every open request of an account as consumed
pub async fn invalidate_pending<'e, E>(executor: E, role: Role, account_id: i64) -> Result<(), DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query(
        "UPDATE email_change_requests SET consumed_at = CURRENT_TIMESTAMP
         WHERE account_role = ? AND account_id = ? AND consumed_at IS NULL",
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
    new_email: &str,
    otp_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<i64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        "INSERT INTO email_change_requests (account_role, account_id, new_email, otp_hash, expires_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(role.as_str())
    .bind(account_id)
    .bind(new_email)
    .bind(otp_hash)
    .bind(expires_at)
    .execute(executor)
    .await?;
    Ok(result.last_insert_id() as i64)
}

/// Latest unconsumed request of an account
pub async fn find_pending(pool: &MySqlPool, role: Role, account_id: i64) -> Result<Option<EmailChangeRequest>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM email_change_requests
         WHERE account_role = ? AND account_id = ? AND consumed_at IS NULL
         ORDER BY created_at DESC, id DESC
         LIMIT 1",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, EmailChangeRequest>(&sql)
        .bind(role.as_str())
        .bind(account_id)
        .fetch_optional(pool)
        .await?)
}

/// Count one verification attempt. The guard and the increment are a single
/// statement, so concurrent callers can never push `attempts` past the cap.
/// Returns false when the request is locked or already consumed.
pub async fn claim_attempt(pool: &MySqlPool, id: i64, max_attempts: i32) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE email_change_requests SET attempts = attempts + 1
         WHERE id = ? AND attempts < ? AND consumed_at IS NULL",
    )
    .bind(id)
    .bind(max_attempts)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Returns false if another request already consumed it
pub async fn consume<'e, E>(executor: E, id: i64) -> Result<bool, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        "UPDATE email_change_requests SET consumed_at = CURRENT_TIMESTAMP WHERE id = ? AND consumed_at IS NULL",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}
