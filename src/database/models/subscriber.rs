use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

use crate::database::manager::DatabaseError;

/// Newsletter subscriber. Token columns hold SHA-256 digests, never raw tokens.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub token_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub unsubscribe_token_hash: String,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

const COLUMNS: &str = "id, email, is_verified, verification_token_hash, token_expires_at, unsubscribe_token_hash, created_at, verified_at";

pub async fn find_by_email(pool: &MySqlPool, email: &str) -> Result<Option<Subscriber>, DatabaseError> {
    let sql = format!("SELECT {} FROM subscribers WHERE email = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Subscriber>(&sql).bind(email).fetch_optional(pool).await?)
}

pub async fn find_by_verification_hash(pool: &MySqlPool, token_hash: &str) -> Result<Option<Subscriber>, DatabaseError> {
    let sql = format!("SELECT {} FROM subscribers WHERE verification_token_hash = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Subscriber>(&sql).bind(token_hash).fetch_optional(pool).await?)
}

pub async fn find_by_unsubscribe_hash(pool: &MySqlPool, token_hash: &str) -> Result<Option<Subscriber>, DatabaseError> {
    let sql = format!("SELECT {} FROM subscribers WHERE unsubscribe_token_hash = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Subscriber>(&sql).bind(token_hash).fetch_optional(pool).await?)
}

pub async fn list(pool: &MySqlPool, verified_only: bool) -> Result<Vec<Subscriber>, DatabaseError> {
    let sql = if verified_only {
        format!("SELECT {} FROM subscribers WHERE is_verified = TRUE ORDER BY created_at DESC", COLUMNS)
    } else {
        format!("SELECT {} FROM subscribers ORDER BY created_at DESC", COLUMNS)
    };
    Ok(sqlx::query_as::<_, Subscriber>(&sql).fetch_all(pool).await?)
}

pub async fn insert(
    pool: &MySqlPool,
    email: &str,
    verification_token_hash: &str,
    token_expires_at: DateTime<Utc>,
    unsubscribe_token_hash: &str,
) -> Result<i64, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO subscribers (email, verification_token_hash, token_expires_at, unsubscribe_token_hash)
         VALUES (?, ?, ?, ?)",
    )
    .bind(email)
    .bind(verification_token_hash)
    .bind(token_expires_at)
    .bind(unsubscribe_token_hash)
    .execute(pool)
    .await?;
    Ok(result.last_insert_id() as i64)
}

/// Replace the pending confirmation token of an unverified subscriber
pub async fn rotate_verification(
    pool: &MySqlPool,
    id: i64,
    verification_token_hash: &str,
    token_expires_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE subscribers SET verification_token_hash = ?, token_expires_at = ?
         WHERE id = ? AND is_verified = FALSE",
    )
    .bind(verification_token_hash)
    .bind(token_expires_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_verified(pool: &MySqlPool, id: i64) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE subscribers
         SET is_verified = TRUE, verified_at = CURRENT_TIMESTAMP,
             verification_token_hash = NULL, token_expires_at = NULL
         WHERE id = ?",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &MySqlPool, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM subscribers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Subscriber {} not found", id)));
    }
    Ok(())
}
