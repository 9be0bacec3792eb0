use serde::Deserialize;
use sqlx::{MySql, MySqlPool, Transaction};

use super::{required, WorkflowError};
use crate::app::AppState;
use crate::database::models::highlight::{self, Highlight, HighlightStatus};
use crate::database::models::notification::{self, NewNotification, Recipient};

#[derive(Debug, Deserialize)]
pub struct HighlightInput {
    pub title: String,
    pub description: String,
    pub status: Option<String>,
}

struct CleanHighlight {
    title: String,
    description: String,
    status: HighlightStatus,
}

fn clean(input: &HighlightInput) -> Result<CleanHighlight, WorkflowError> {
    let status = match input.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map_err(|e: String| WorkflowError::field("status", e))?,
        None => HighlightStatus::Published,
    };
    Ok(CleanHighlight {
        title: required("title", &input.title)?,
        description: required("description", &input.description)?,
        status,
    })
}

/// Every highlight change is mirrored to superadmins in the same transaction
async fn notify_superadmins(
    tx: &mut Transaction<'static, MySql>,
    kind: &str,
    message: &str,
) -> Result<(), WorkflowError> {
    notification::insert(
        &mut **tx,
        NewNotification {
            recipient: Recipient::AllSuperadmins,
            kind,
            message,
            link: None,
        },
    )
    .await?;
    Ok(())
}

pub struct HighlightService {
    pool: MySqlPool,
}

impl HighlightService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }

    pub async fn list_published(&self) -> Result<Vec<Highlight>, WorkflowError> {
        Ok(highlight::list_published(&self.pool, None).await?)
    }

    pub async fn list_for_organization(&self, organization_id: i64) -> Result<Vec<Highlight>, WorkflowError> {
        Ok(highlight::list_by_organization(&self.pool, organization_id).await?)
    }

    pub async fn get(&self, organization_id: i64, id: i64) -> Result<Highlight, WorkflowError> {
        highlight::find_owned(&self.pool, id, organization_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Highlight {} not found", id)))
    }

    pub async fn create(&self, organization_id: i64, input: HighlightInput) -> Result<Highlight, WorkflowError> {
        let input = clean(&input)?;

        let mut tx = self.pool.begin().await?;
        let id = highlight::insert(&mut *tx, organization_id, &input.title, &input.description, input.status).await?;
        notify_superadmins(
            &mut tx,
            "highlight_created",
            &format!("Organization #{} posted highlight \"{}\"", organization_id, input.title),
        )
        .await?;
        let created = highlight::find_owned(&mut *tx, id, organization_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Highlight {} not found", id)))?;
        tx.commit().await?;

        tracing::info!(highlight_id = id, organization_id, "Highlight created");
        Ok(created)
    }

    pub async fn update(&self, organization_id: i64, id: i64, input: HighlightInput) -> Result<Highlight, WorkflowError> {
        let input = clean(&input)?;

        let mut tx = self.pool.begin().await?;
        highlight::find_owned(&mut *tx, id, organization_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Highlight {} not found", id)))?;
        highlight::update(&mut *tx, id, &input.title, &input.description, input.status).await?;
        notify_superadmins(
            &mut tx,
            "highlight_updated",
            &format!("Organization #{} updated highlight \"{}\"", organization_id, input.title),
        )
        .await?;
        let updated = highlight::find_owned(&mut *tx, id, organization_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Highlight {} not found", id)))?;
        tx.commit().await?;

        tracing::info!(highlight_id = id, organization_id, "Highlight updated");
        Ok(updated)
    }

    pub async fn delete(&self, organization_id: i64, id: i64) -> Result<(), WorkflowError> {
        let mut tx = self.pool.begin().await?;
        let existing = highlight::find_owned(&mut *tx, id, organization_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Highlight {} not found", id)))?;
        highlight::delete(&mut *tx, id).await?;
        notify_superadmins(
            &mut tx,
            "highlight_deleted",
            &format!("Organization #{} removed highlight \"{}\"", organization_id, existing.title),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(highlight_id = id, organization_id, "Highlight deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(status: Option<&str>) -> HighlightInput {
        HighlightInput {
            title: " Outreach ".to_string(),
            description: "Visited Barangay 5".to_string(),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn status_defaults_to_published() {
        let cleaned = clean(&input(None)).unwrap();
        assert_eq!(cleaned.status, HighlightStatus::Published);
        assert_eq!(cleaned.title, "Outreach");
    }

    #[test]
    fn rejects_unknown_status_and_blank_title() {
        assert!(clean(&input(Some("draft"))).is_err());
        let blank = HighlightInput {
            title: " ".to_string(),
            ..input(None)
        };
        assert!(clean(&blank).is_err());
    }
}
