use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, MySql, MySqlPool};
use std::str::FromStr;

use crate::database::manager::DatabaseError;

/// A proposed change awaiting superadmin review
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub organization_id: i64,
    pub submitted_by: i64,
    pub section: String,
    pub record_id: Option<i64>,
    pub previous_data: Value,
    pub proposed_data: Value,
    pub status: String,
    pub remarks: Option<String>,
    pub reviewed_by: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Submission with the organization and submitter, for review queues
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubmissionListing {
    pub id: i64,
    pub organization_id: i64,
    pub org_acronym: String,
    pub org_name: String,
    pub submitted_by: i64,
    pub submitted_by_email: String,
    pub section: String,
    pub record_id: Option<i64>,
    pub status: String,
    pub remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Cancelled => "cancelled",
        }
    }

    /// Only pending submissions move, and only to a terminal state
    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        *self == SubmissionStatus::Pending && next != SubmissionStatus::Pending
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            "cancelled" => Ok(SubmissionStatus::Cancelled),
            other => Err(format!("Unknown submission status '{}'", other)),
        }
    }
}

pub struct NewSubmission<'a> {
    pub organization_id: i64,
    pub submitted_by: i64,
    pub section: &'a str,
    pub record_id: Option<i64>,
    pub previous_data: &'a Value,
    pub proposed_data: &'a Value,
}

const COLUMNS: &str = "id, organization_id, submitted_by, section, record_id, previous_data, proposed_data,
     status, remarks, reviewed_by, submitted_at, reviewed_at";

const LISTING: &str = "SELECT s.id, s.organization_id, o.acronym AS org_acronym, o.name AS org_name,
        s.submitted_by, a.email AS submitted_by_email, s.section, s.record_id, s.status, s.remarks,
        s.submitted_at, s.reviewed_at
     FROM submissions s
     JOIN organizations o ON o.id = s.organization_id
     JOIN admins a ON a.id = s.submitted_by";

pub async fn insert<'e, E>(executor: E, submission: NewSubmission<'_>) -> Result<i64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        "INSERT INTO submissions (organization_id, submitted_by, section, record_id, previous_data, proposed_data)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(submission.organization_id)
    .bind(submission.submitted_by)
    .bind(submission.section)
    .bind(submission.record_id)
    .bind(submission.previous_data)
    .bind(submission.proposed_data)
    .execute(executor)
    .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Submission>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM submissions WHERE id = ?", COLUMNS);
    Ok(sqlx::query_as::<_, Submission>(&sql).bind(id).fetch_optional(executor).await?)
}

/// Lock the row for the rest of the transaction
pub async fn find_for_update<'e, E>(executor: E, id: i64) -> Result<Option<Submission>, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let sql = format!("SELECT {} FROM submissions WHERE id = ? FOR UPDATE", COLUMNS);
    Ok(sqlx::query_as::<_, Submission>(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn list(pool: &MySqlPool, status: Option<SubmissionStatus>) -> Result<Vec<SubmissionListing>, DatabaseError> {
    let rows = match status {
        Some(status) => {
            let sql = format!("{} WHERE s.status = ? ORDER BY s.submitted_at DESC", LISTING);
            sqlx::query_as::<_, SubmissionListing>(&sql)
                .bind(status.as_str())
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{} ORDER BY s.submitted_at DESC", LISTING);
            sqlx::query_as::<_, SubmissionListing>(&sql).fetch_all(pool).await?
        }
    };
    Ok(rows)
}

pub async fn list_by_organization(pool: &MySqlPool, organization_id: i64) -> Result<Vec<SubmissionListing>, DatabaseError> {
    let sql = format!("{} WHERE s.organization_id = ? ORDER BY s.submitted_at DESC", LISTING);
    Ok(sqlx::query_as::<_, SubmissionListing>(&sql)
        .bind(organization_id)
        .fetch_all(pool)
        .await?)
}

/// Move a pending submission to a final state. Returns false when it was no longer pending.
pub async fn close<'e, E>(
    executor: E,
    id: i64,
    status: SubmissionStatus,
    reviewed_by: Option<i64>,
    remarks: Option<&str>,
) -> Result<bool, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        "UPDATE submissions
         SET status = ?, reviewed_by = ?, remarks = ?, reviewed_at = CURRENT_TIMESTAMP
         WHERE id = ? AND status = 'pending'",
    )
    .bind(status.as_str())
    .bind(reviewed_by)
    .bind(remarks)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Record the id of a row created by an approved submission
pub async fn set_record_id<'e, E>(executor: E, id: i64, record_id: i64) -> Result<(), DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query("UPDATE submissions SET record_id = ? WHERE id = ?")
        .bind(record_id)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_any_final_state() {
        let pending = SubmissionStatus::Pending;
        assert!(pending.can_transition_to(SubmissionStatus::Approved));
        assert!(pending.can_transition_to(SubmissionStatus::Rejected));
        assert!(pending.can_transition_to(SubmissionStatus::Cancelled));
        assert!(!pending.can_transition_to(SubmissionStatus::Pending));
    }

    #[test]
    fn final_states_are_terminal() {
        for status in [
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
            SubmissionStatus::Cancelled,
        ] {
            assert!(!status.can_transition_to(SubmissionStatus::Approved));
            assert!(!status.can_transition_to(SubmissionStatus::Pending));
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in ["pending", "approved", "rejected", "cancelled"] {
            assert_eq!(status.parse::<SubmissionStatus>().unwrap().as_str(), status);
        }
    }
}
