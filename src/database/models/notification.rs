use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySql, MySqlPool};

use crate::auth::Role;
use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub recipient_role: String,
    /// `None` on superadmin notifications means every superadmin sees it
    pub recipient_id: Option<i64>,
    pub kind: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Admin(i64),
    AllSuperadmins,
}

impl Recipient {
    fn role(&self) -> Role {
        match self {
            Recipient::Admin(_) => Role::Admin,
            Recipient::AllSuperadmins => Role::Superadmin,
        }
    }

    fn id(&self) -> Option<i64> {
        match self {
            Recipient::Admin(id) => Some(*id),
            Recipient::AllSuperadmins => None,
        }
    }
}

pub struct NewNotification<'a> {
    pub recipient: Recipient,
    pub kind: &'a str,
    pub message: &'a str,
    pub link: Option<&'a str>,
}

const COLUMNS: &str = "id, recipient_role, recipient_id, kind, message, link, is_read, created_at";

pub async fn insert<'e, E>(executor: E, notification: NewNotification<'_>) -> Result<i64, DatabaseError>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        "INSERT INTO notifications (recipient_role, recipient_id, kind, message, link) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(notification.recipient.role().as_str())
    .bind(notification.recipient.id())
    .bind(notification.kind)
    .bind(notification.message)
    .bind(notification.link)
    .execute(executor)
    .await?;
    Ok(result.last_insert_id() as i64)
}

/// Notifications visible to an account; superadmins also see broadcasts
pub async fn list_for(pool: &MySqlPool, role: Role, account_id: i64) -> Result<Vec<Notification>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM notifications
         WHERE recipient_role = ? AND (recipient_id = ? OR (recipient_role = 'superadmin' AND recipient_id IS NULL))
         ORDER BY created_at DESC, id DESC
         LIMIT 200",
        COLUMNS
    );
    Ok(sqlx::query_as::<_, Notification>(&sql)
        .bind(role.as_str())
        .bind(account_id)
        .fetch_all(pool)
        .await?)
}

pub async fn mark_read(pool: &MySqlPool, id: i64, role: Role, account_id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE
         WHERE id = ? AND recipient_role = ? AND (recipient_id = ? OR (recipient_role = 'superadmin' AND recipient_id IS NULL))",
    )
    .bind(id)
    .bind(role.as_str())
    .bind(account_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        let exists: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM notifications
             WHERE id = ? AND recipient_role = ? AND (recipient_id = ? OR (recipient_role = 'superadmin' AND recipient_id IS NULL))",
        )
        .bind(id)
        .bind(role.as_str())
        .bind(account_id)
        .fetch_optional(pool)
        .await?;
        if exists.is_none() {
            return Err(DatabaseError::NotFound(format!("Notification {} not found", id)));
        }
    }
    Ok(())
}

pub async fn mark_all_read(pool: &MySqlPool, role: Role, account_id: i64) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE
         WHERE is_read = FALSE AND recipient_role = ?
           AND (recipient_id = ? OR (recipient_role = 'superadmin' AND recipient_id IS NULL))",
    )
    .bind(role.as_str())
    .bind(account_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_has_no_recipient_id() {
        assert_eq!(Recipient::AllSuperadmins.id(), None);
        assert_eq!(Recipient::AllSuperadmins.role(), Role::Superadmin);
        assert_eq!(Recipient::Admin(7).id(), Some(7));
        assert_eq!(Recipient::Admin(7).role(), Role::Admin);
    }
}
