use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySql, MySqlPool};
use std::str::FromStr;

use crate::database::manager::DatabaseError;

/// Per-organization account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: i64,
    pub organization_id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin joined with the organization it manages, used in superadmin listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminListing {
    pub id: i64,
    pub email: String,
    pub status: String,
    pub organization_id: i64,
    pub org_acronym: String,
    pub org_name: String,
    pub org_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Active,
    Inactive,
}

impl AdminStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::Active => "active",
            AdminStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for AdminStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AdminStatus::Active),
            "inactive" => Ok(AdminStatus::Inactive),
            other => Err(format!("Unknown admin status '{}'", other)),
        }
    }
}

impl Admin {
    pub fn is_active(&self) -> bool {
        self.status == AdminStatus::Active.as_str()
    }
}

const COLUMNS: &str = "id, organization_id, email, password_hash, status, created_at, updated_at";

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Admin>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM admins WHERE id = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Admin>(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn find_by_email(pool: &MySqlPool, email: &str) -> Result<Option<Admin>, DatabaseError> {
    let sql = format!("SELECT {} FROM admins WHERE email = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Admin>(&sql).bind(email).fetch_optional(pool).await?)
}

pub async fn list_with_organization(pool: &MySqlPool) -> Result<Vec<AdminListing>, DatabaseError> {
    Ok(sqlx::query_as::<_, AdminListing>(
        "SELECT a.id, a.email, a.status, a.organization_id,
                o.acronym AS org_acronym, o.name AS org_name, o.status AS org_status, a.created_at
         FROM admins a
         JOIN organizations o ON o.id = a.organization_id
         ORDER BY a.created_at DESC",
    )
    .fetch_all(pool)
    .await?)
}

pub async fn insert<'e, E>(
    executor: E,
    organization_id: i64,
    email: &str,
    password_hash: &str,
) -> Result<i64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query("INSERT INTO admins (organization_id, email, password_hash) VALUES (?, ?, ?)")
        .bind(organization_id)
        .bind(email)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn update_email<'e, E>(executor: E, id: i64, email: &str) -> Result<(), DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query("UPDATE admins SET email = ? WHERE id = ?")
        .bind(email)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Number of rows changed; 0 when the admin no longer exists
pub async fn update_password<'e, E>(executor: E, id: i64, password_hash: &str) -> Result<u64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query("UPDATE admins SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_status(pool: &MySqlPool, id: i64, status: AdminStatus) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE admins SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    // Unchanged rows report 0 affected, so distinguish from a missing row
    if result.rows_affected() == 0 && find_by_id(pool, id).await?.is_none() {
        return Err(DatabaseError::NotFound(format!("Admin {} not found", id)));
    }
    Ok(())
}

pub async fn delete(pool: &MySqlPool, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM admins WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Admin {} not found", id)));
    }
    Ok(())
}
