use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct News {
    pub id: i64,
    pub organization_id: i64,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NewsListing {
    pub id: i64,
    pub organization_id: i64,
    pub org_acronym: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, organization_id, title, description, published_at, updated_at";

pub async fn list_public(pool: &MySqlPool, limit: u32) -> Result<Vec<NewsListing>, DatabaseError> {
    Ok(sqlx::query_as::<_, NewsListing>(
        "SELECT n.id, n.organization_id, o.acronym AS org_acronym, n.title, n.description, n.published_at
         FROM news n
         JOIN organizations o ON o.id = n.organization_id
         WHERE o.status = 'active'
         ORDER BY n.published_at DESC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn list_by_organization(pool: &MySqlPool, organization_id: i64) -> Result<Vec<News>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM news WHERE organization_id = ? ORDER BY published_at DESC",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, News>(&sql).bind(organization_id).fetch_all(pool).await?)
}

pub async fn find_owned(pool: &MySqlPool, id: i64, organization_id: i64) -> Result<Option<News>, DatabaseError> {
    let sql = format!("SELECT {} FROM news WHERE id = ? AND organization_id = ?", COLUMNS);
    Ok(sqlx::query_as::<_, News>(&sql)
        .bind(id)
        .bind(organization_id)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert(pool: &MySqlPool, organization_id: i64, title: &str, description: &str) -> Result<i64, DatabaseError> {
    let result = sqlx::query("INSERT INTO news (organization_id, title, description) VALUES (?, ?, ?)")
        .bind(organization_id)
        .bind(title)
        .bind(description)
        .execute(pool)
        .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn update_owned(
    pool: &MySqlPool,
    id: i64,
    organization_id: i64,
    title: &str,
    description: &str,
) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE news SET title = ?, description = ? WHERE id = ? AND organization_id = ?")
        .bind(title)
        .bind(description)
        .bind(id)
        .bind(organization_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        // MySQL reports 0 affected rows when values are unchanged, so re-check existence
        if find_owned(pool, id, organization_id).await?.is_none() {
            return Err(DatabaseError::NotFound(format!("News {} not found", id)));
        }
    }
    Ok(())
}

pub async fn delete_owned(pool: &MySqlPool, id: i64, organization_id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM news WHERE id = ? AND organization_id = ?")
        .bind(id)
        .bind(organization_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("News {} not found", id)));
    }
    Ok(())
}
