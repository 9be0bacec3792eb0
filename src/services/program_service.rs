use serde::Deserialize;
use sqlx::MySqlPool;

use super::{required, WorkflowError};
use crate::app::AppState;
use crate::database::models::program::{self, Program, ProgramListing, ProgramStatus};
use crate::database::models::volunteer::{self, NewVolunteer, VolunteerListing, VolunteerStatus};
use crate::database::DatabaseError;
use crate::email;

/// Volunteer sign-up form
#[derive(Debug, Deserialize)]
pub struct VolunteerApplication {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub motivation: Option<String>,
}

fn optional_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub struct ProgramService {
    pool: MySqlPool,
}

impl ProgramService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }

    pub async fn list_public(&self, status: Option<&str>) -> Result<Vec<ProgramListing>, WorkflowError> {
        let status = status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<ProgramStatus>().map_err(|e| WorkflowError::field("status", e)))
            .transpose()?;
        Ok(program::list_public(&self.pool, status).await?)
    }

    pub async fn get_public(&self, id: i64) -> Result<ProgramListing, WorkflowError> {
        program::find_public(&self.pool, id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Program {} not found", id)))
    }

    pub async fn apply(&self, program_id: i64, application: VolunteerApplication) -> Result<i64, WorkflowError> {
        let full_name = required("full_name", &application.full_name)?;
        if !email::is_valid_email(&application.email) {
            return Err(WorkflowError::field("email", "Invalid email format"));
        }
        let email = email::normalize_email(&application.email);

        let target = self.get_public(program_id).await?;
        if target.status == ProgramStatus::Completed.as_str() {
            return Err(WorkflowError::Validation(
                "This program is already completed and no longer accepts volunteers".to_string(),
            ));
        }

        let inserted = volunteer::insert(
            &self.pool,
            NewVolunteer {
                program_id,
                full_name: &full_name,
                email: &email,
                phone: optional_text(&application.phone),
                motivation: optional_text(&application.motivation),
            },
        )
        .await;

        match inserted {
            Ok(id) => {
                tracing::info!(volunteer_id = id, program_id, "Volunteer application received");
                Ok(id)
            }
            Err(DatabaseError::Duplicate(_)) => Err(WorkflowError::Conflict(
                "This email has already applied to the program".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_for_organization(&self, organization_id: i64) -> Result<Vec<Program>, WorkflowError> {
        Ok(program::list_by_organization(&self.pool, organization_id).await?)
    }

    pub async fn delete(&self, organization_id: i64, id: i64) -> Result<(), WorkflowError> {
        program::delete_owned(&self.pool, id, organization_id).await?;
        tracing::info!(program_id = id, organization_id, "Program deleted");
        Ok(())
    }

    pub async fn list_volunteers(&self, organization_id: i64) -> Result<Vec<VolunteerListing>, WorkflowError> {
        Ok(volunteer::list_by_organization(&self.pool, organization_id).await?)
    }

    /// Approve or decline a pending application for one of the organization's programs
    pub async fn decide_volunteer(
        &self,
        organization_id: i64,
        id: i64,
        status: &str,
    ) -> Result<VolunteerListing, WorkflowError> {
        let next: VolunteerStatus = status.parse().map_err(|e: String| WorkflowError::field("status", e))?;
        if next == VolunteerStatus::Pending {
            return Err(WorkflowError::field("status", "must be 'approved' or 'declined'"));
        }

        let application = volunteer::find_listing(&self.pool, id)
            .await?
            .filter(|v| v.organization_id == organization_id)
            .ok_or_else(|| WorkflowError::NotFound(format!("Volunteer {} not found", id)))?;

        let current: VolunteerStatus = application
            .status
            .parse()
            .map_err(|e: String| WorkflowError::Validation(e))?;
        if !current.can_transition_to(next) || !volunteer::decide(&self.pool, id, next).await? {
            return Err(WorkflowError::Conflict(format!(
                "Application was already {}",
                application.status
            )));
        }

        tracing::info!(volunteer_id = id, status = next.as_str(), "Volunteer application decided");
        Ok(VolunteerListing {
            status: next.as_str().to_string(),
            ..application
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(&Some("  ".to_string())), None);
        assert_eq!(optional_text(&None), None);
        assert_eq!(optional_text(&Some(" 0917 ".to_string())), Some("0917"));
    }
}
