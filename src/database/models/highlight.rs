use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySql, MySqlPool};
use std::str::FromStr;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Highlight {
    pub id: i64,
    pub organization_id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightStatus {
    Published,
    Archived,
}

impl HighlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightStatus::Published => "published",
            HighlightStatus::Archived => "archived",
        }
    }
}

impl FromStr for HighlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(HighlightStatus::Published),
            "archived" => Ok(HighlightStatus::Archived),
            other => Err(format!("Unknown highlight status '{}'", other)),
        }
    }
}

const COLUMNS: &str = "id, organization_id, title, description, status, created_at, updated_at";

pub async fn list_published(pool: &MySqlPool, organization_id: Option<i64>) -> Result<Vec<Highlight>, DatabaseError> {
    let rows = match organization_id {
        Some(org) => {
            let sql = format!(
                "SELECT {} FROM admin_highlights WHERE status = 'published' AND organization_id = ? ORDER BY created_at DESC",
                COLUMNS
            );
            sqlx::query_as::<_, Highlight>(&sql).bind(org).fetch_all(pool).await?
        }
        None => {
            sqlx::query_as::<_, Highlight>(
                "SELECT h.id, h.organization_id, h.title, h.description, h.status, h.created_at, h.updated_at
                 FROM admin_highlights h
                 JOIN organizations o ON o.id = h.organization_id
                 WHERE h.status = 'published' AND o.status = 'active'
                 ORDER BY h.created_at DESC",
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

pub async fn list_by_organization(pool: &MySqlPool, organization_id: i64) -> Result<Vec<Highlight>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM admin_highlights WHERE organization_id = ? ORDER BY created_at DESC",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, Highlight>(&sql).bind(organization_id).fetch_all(pool).await?)
}

pub async fn find_owned<'e, E>(executor: E, id: i64, organization_id: i64) -> Result<Option<Highlight>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!(
        "SELECT {} FROM admin_highlights WHERE id = ? AND organization_id = ?",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, Highlight>(&sql)
        .bind(id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await?)
}

pub async fn insert<'e, E>(
    executor: E,
    organization_id: i64,
    title: &str,
    description: &str,
    status: HighlightStatus,
) -> Result<i64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        "INSERT INTO admin_highlights (organization_id, title, description, status) VALUES (?, ?, ?, ?)",
    )
    .bind(organization_id)
    .bind(title)
    .bind(description)
    .bind(status.as_str())
    .execute(executor)
    .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn update<'e, E>(
    executor: E,
    id: i64,
    title: &str,
    description: &str,
    status: HighlightStatus,
) -> Result<(), DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query("UPDATE admin_highlights SET title = ?, description = ?, status = ? WHERE id = ?")
        .bind(title)
        .bind(description)
        .bind(status.as_str())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<(), DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query("DELETE FROM admin_highlights WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
