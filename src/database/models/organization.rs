use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySql, MySqlPool};
use std::str::FromStr;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: i64,
    pub acronym: String,
    pub name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub facebook: Option<String>,
    pub org_color: Option<String>,
    pub logo: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationStatus {
    Active,
    Inactive,
}

impl OrganizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationStatus::Active => "active",
            OrganizationStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for OrganizationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OrganizationStatus::Active),
            "inactive" => Ok(OrganizationStatus::Inactive),
            other => Err(format!("Unknown organization status '{}'", other)),
        }
    }
}

impl Organization {
    pub fn is_active(&self) -> bool {
        self.status == OrganizationStatus::Active.as_str()
    }
}

const COLUMNS: &str = "id, acronym, name, description, email, phone, facebook, org_color, logo, status, created_at, updated_at";

pub async fn list_active(pool: &MySqlPool) -> Result<Vec<Organization>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM organizations WHERE status = 'active' ORDER BY name",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, Organization>(&sql).fetch_all(pool).await?)
}

pub async fn list_all(pool: &MySqlPool) -> Result<Vec<Organization>, DatabaseError> {
    let sql = format!("SELECT {} FROM organizations ORDER BY created_at DESC", COLUMNS);
    Ok(sqlx::query_as::<_, Organization>(&sql).fetch_all(pool).await?)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Organization>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM organizations WHERE id = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Organization>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

/// Same as `find_by_id`, but holds a row lock until the transaction ends
pub async fn find_by_id_for_update<'e, E>(executor: E, id: i64) -> Result<Option<Organization>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM organizations WHERE id = ? FOR UPDATE", COLUMNS);
    Ok(sqlx::query_as::<_, Organization>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn find_by_acronym(pool: &MySqlPool, acronym: &str) -> Result<Option<Organization>, DatabaseError> {
    let sql = format!("SELECT {} FROM organizations WHERE acronym = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Organization>(&sql)
        .bind(acronym)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert<'e, E>(executor: E, acronym: &str, name: &str, email: &str) -> Result<i64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query("INSERT INTO organizations (acronym, name, email) VALUES (?, ?, ?)")
        .bind(acronym)
        .bind(name)
        .bind(email)
        .execute(executor)
        .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn set_status(pool: &MySqlPool, id: i64, status: OrganizationStatus) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE organizations SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    // Unchanged rows report 0 affected, so distinguish from a missing row
    if result.rows_affected() == 0 && find_by_id(pool, id).await?.is_none() {
        return Err(DatabaseError::NotFound(format!("Organization {} not found", id)));
    }
    Ok(())
}

pub async fn delete(pool: &MySqlPool, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM organizations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Organization {} not found", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status() {
        assert_eq!("active".parse::<OrganizationStatus>(), Ok(OrganizationStatus::Active));
        assert_eq!("inactive".parse::<OrganizationStatus>(), Ok(OrganizationStatus::Inactive));
        assert!("archived".parse::<OrganizationStatus>().is_err());
    }
}
