use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use std::str::FromStr;

use crate::database::manager::DatabaseError;

/// Volunteer application joined with its program, for admin review
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VolunteerListing {
    pub id: i64,
    pub program_id: i64,
    pub program_title: String,
    pub organization_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub motivation: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolunteerStatus {
    Pending,
    Approved,
    Declined,
}

impl VolunteerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolunteerStatus::Pending => "pending",
            VolunteerStatus::Approved => "approved",
            VolunteerStatus::Declined => "declined",
        }
    }

    /// Applications are decided once; a decision is final
    pub fn can_transition_to(&self, next: VolunteerStatus) -> bool {
        matches!(
            (self, next),
            (VolunteerStatus::Pending, VolunteerStatus::Approved)
                | (VolunteerStatus::Pending, VolunteerStatus::Declined)
        )
    }
}

impl FromStr for VolunteerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VolunteerStatus::Pending),
            "approved" => Ok(VolunteerStatus::Approved),
            "declined" => Ok(VolunteerStatus::Declined),
            other => Err(format!("Unknown volunteer status '{}'", other)),
        }
    }
}

pub struct NewVolunteer<'a> {
    pub program_id: i64,
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub motivation: Option<&'a str>,
}

pub async fn insert(pool: &MySqlPool, volunteer: NewVolunteer<'_>) -> Result<i64, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO volunteers (program_id, full_name, email, phone, motivation) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(volunteer.program_id)
    .bind(volunteer.full_name)
    .bind(volunteer.email)
    .bind(volunteer.phone)
    .bind(volunteer.motivation)
    .execute(pool)
    .await?;
    Ok(result.last_insert_id() as i64)
}

const LISTING: &str = "SELECT v.id, v.program_id, p.title AS program_title, p.organization_id,
        v.full_name, v.email, v.phone, v.motivation, v.status, v.created_at
     FROM volunteers v
     JOIN programs p ON p.id = v.program_id";

pub async fn list_by_organization(pool: &MySqlPool, organization_id: i64) -> Result<Vec<VolunteerListing>, DatabaseError> {
    let sql = format!("{} WHERE p.organization_id = ? ORDER BY v.created_at DESC", LISTING);
    Ok(sqlx::query_as::<_, VolunteerListing>(&sql)
        .bind(organization_id)
        .fetch_all(pool)
        .await?)
}

pub async fn find_listing(pool: &MySqlPool, id: i64) -> Result<Option<VolunteerListing>, DatabaseError> {
    let sql = format!("{} WHERE v.id = ?", LISTING);
    Ok(sqlx::query_as::<_, VolunteerListing>(&sql).bind(id).fetch_optional(pool).await?)
}

/// Conditional update so two reviewers cannot both decide the same application
pub async fn decide(pool: &MySqlPool, id: i64, status: VolunteerStatus) -> Result<bool, DatabaseError> {
    let result = sqlx::query("UPDATE volunteers SET status = ? WHERE id = ? AND status = 'pending'")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_applications_can_be_decided() {
        assert!(VolunteerStatus::Pending.can_transition_to(VolunteerStatus::Approved));
        assert!(VolunteerStatus::Pending.can_transition_to(VolunteerStatus::Declined));
        assert!(!VolunteerStatus::Approved.can_transition_to(VolunteerStatus::Declined));
        assert!(!VolunteerStatus::Declined.can_transition_to(VolunteerStatus::Pending));
        assert!(!VolunteerStatus::Pending.can_transition_to(VolunteerStatus::Pending));
    }
}
