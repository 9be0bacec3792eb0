use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySql, MySqlPool};

use crate::database::manager::DatabaseError;

/// Platform-wide account that reviews submissions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Superadmin {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, username, email, password_hash, created_at";

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Superadmin>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM superadmins WHERE id = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Superadmin>(&sql).bind(id).fetch_optional(executor).await?)
}

/// Look up by username or email, whichever the caller typed
pub async fn find_by_login(pool: &MySqlPool, login: &str) -> Result<Option<Superadmin>, DatabaseError> {
    let sql = format!("SELECT {} FROM superadmins WHERE username = ? OR email = ? LIMIT 1", COLUMNS);
    Ok(sqlx::query_as::<_, Superadmin>(&sql)
        .bind(login)
        .bind(login)
        .fetch_optional(pool)
        .await?)
}

pub async fn find_by_email(pool: &MySqlPool, email: &str) -> Result<Option<Superadmin>, DatabaseError> {
    let sql = format!("SELECT {} FROM superadmins WHERE email = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Superadmin>(&sql).bind(email).fetch_optional(pool).await?)
}

pub async fn insert(pool: &MySqlPool, username: &str, email: &str, password_hash: &str) -> Result<i64, DatabaseError> {
    let result = sqlx::query("INSERT INTO superadmins (username, email, password_hash) VALUES (?, ?, ?)")
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn update_email<'e, E>(executor: E, id: i64, email: &str) -> Result<(), DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query("UPDATE superadmins SET email = ? WHERE id = ?")
        .bind(email)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn update_password<'e, E>(executor: E, id: i64, password_hash: &str) -> Result<u64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query("UPDATE superadmins SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
