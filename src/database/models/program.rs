use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySql, MySqlPool};
use std::str::FromStr;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Program {
    pub id: i64,
    pub organization_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub event_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Program as shown on public pages, with the owning organization
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgramListing {
    pub id: i64,
    pub organization_id: i64,
    pub org_acronym: String,
    pub org_name: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub event_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Upcoming,
    Active,
    Completed,
}

impl ProgramStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::Upcoming => "upcoming",
            ProgramStatus::Active => "active",
            ProgramStatus::Completed => "completed",
        }
    }
}

impl FromStr for ProgramStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(ProgramStatus::Upcoming),
            "active" => Ok(ProgramStatus::Active),
            "completed" => Ok(ProgramStatus::Completed),
            other => Err(format!("Unknown program status '{}'", other)),
        }
    }
}

const COLUMNS: &str = "id, organization_id, title, description, category, status, event_date, created_at, updated_at";

const LISTING: &str = "SELECT p.id, p.organization_id, o.acronym AS org_acronym, o.name AS org_name,
        p.title, p.description, p.category, p.status, p.event_date, p.created_at
     FROM programs p
     JOIN organizations o ON o.id = p.organization_id
     WHERE o.status = 'active'";

pub async fn list_public(pool: &MySqlPool, status: Option<ProgramStatus>) -> Result<Vec<ProgramListing>, DatabaseError> {
    let rows = match status {
        Some(status) => {
            let sql = format!("{} AND p.status = ? ORDER BY p.event_date IS NULL, p.event_date, p.id", LISTING);
            sqlx::query_as::<_, ProgramListing>(&sql)
                .bind(status.as_str())
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{} ORDER BY p.event_date IS NULL, p.event_date, p.id", LISTING);
            sqlx::query_as::<_, ProgramListing>(&sql).fetch_all(pool).await?
        }
    };
    Ok(rows)
}

pub async fn find_public(pool: &MySqlPool, id: i64) -> Result<Option<ProgramListing>, DatabaseError> {
    let sql = format!("{} AND p.id = ?", LISTING);
    Ok(sqlx::query_as::<_, ProgramListing>(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn list_by_organization(pool: &MySqlPool, organization_id: i64) -> Result<Vec<Program>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM programs WHERE organization_id = ? ORDER BY created_at DESC",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, Program>(&sql)
        .bind(organization_id)
        .fetch_all(pool)
        .await?)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Program>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM programs WHERE id = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Program>(&sql).bind(id).fetch_optional(executor).await?)
}

/// Locking read used while an approval rewrites the row
pub async fn find_by_id_for_update<'e, E>(executor: E, id: i64) -> Result<Option<Program>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM programs WHERE id = ? FOR UPDATE", COLUMNS);
    Ok(sqlx::query_as::<_, Program>(&sql).bind(id).fetch_optional(executor).await?)
}

/// Delete a program only if it belongs to the given organization
pub async fn delete_owned(pool: &MySqlPool, id: i64, organization_id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM programs WHERE id = ? AND organization_id = ?")
        .bind(id)
        .bind(organization_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Program {} not found", id)));
    }
    Ok(())
}
