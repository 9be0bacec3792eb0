use serde::Serialize;
use sqlx::MySqlPool;

use super::{required, WorkflowError};
use crate::app::AppState;
use crate::auth::password;
use crate::database::models::admin::{self, AdminListing, AdminStatus};
use crate::database::models::highlight::{self, Highlight};
use crate::database::models::news::{self, News};
use crate::database::models::organization::{self, Organization, OrganizationStatus};
use crate::database::models::program::{self, Program};
use crate::database::DatabaseError;
use crate::email;

const MAX_ACRONYM_LENGTH: usize = 20;

/// Public organization page
#[derive(Debug, Serialize)]
pub struct OrganizationProfile {
    #[serde(flatten)]
    pub organization: Organization,
    pub programs: Vec<Program>,
    pub news: Vec<News>,
    pub highlights: Vec<Highlight>,
}

pub struct NewAdminAccount {
    pub org_acronym: String,
    pub org_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedAdmin {
    pub admin_id: i64,
    pub organization_id: i64,
    pub email: String,
    pub org_acronym: String,
}

pub fn validate_acronym(raw: &str) -> Result<String, WorkflowError> {
    let acronym = required("org_acronym", raw)?;
    if acronym.chars().count() > MAX_ACRONYM_LENGTH {
        return Err(WorkflowError::field(
            "org_acronym",
            format!("must be at most {} characters", MAX_ACRONYM_LENGTH),
        ));
    }
    if !acronym.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(WorkflowError::field(
            "org_acronym",
            "may only contain letters, digits and hyphens",
        ));
    }
    Ok(acronym)
}

pub struct OrganizationService {
    pool: MySqlPool,
}

impl OrganizationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }

    pub async fn list_active(&self) -> Result<Vec<Organization>, WorkflowError> {
        Ok(organization::list_active(&self.pool).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Organization>, WorkflowError> {
        Ok(organization::list_all(&self.pool).await?)
    }

    pub async fn public_profile(&self, acronym: &str) -> Result<OrganizationProfile, WorkflowError> {
        let org = organization::find_by_acronym(&self.pool, acronym.trim())
            .await?
            .filter(Organization::is_active)
            .ok_or_else(|| WorkflowError::NotFound(format!("Organization '{}' not found", acronym)))?;

        let programs = program::list_by_organization(&self.pool, org.id).await?;
        let news = news::list_by_organization(&self.pool, org.id).await?;
        let highlights = highlight::list_published(&self.pool, Some(org.id)).await?;

        Ok(OrganizationProfile {
            organization: org,
            programs,
            news,
            highlights,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Organization, WorkflowError> {
        organization::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Organization {} not found", id)))
    }

    pub async fn set_status(&self, id: i64, status: &str) -> Result<Organization, WorkflowError> {
        let status: OrganizationStatus = status.parse().map_err(|e: String| WorkflowError::field("status", e))?;
        organization::set_status(&self.pool, id, status).await?;
        tracing::info!(organization_id = id, status = status.as_str(), "Organization status changed");
        self.get(id).await
    }

    /// Removes the organization and, through cascading keys, everything it owns
    pub async fn delete(&self, id: i64) -> Result<(), WorkflowError> {
        organization::delete(&self.pool, id).await?;
        tracing::info!(organization_id = id, "Organization deleted");
        Ok(())
    }

    /// Create an organization and its first admin together
    pub async fn create_admin(&self, input: NewAdminAccount) -> Result<CreatedAdmin, WorkflowError> {
        let org_acronym = validate_acronym(&input.org_acronym)?;
        let org_name = required("org_name", &input.org_name)?;
        if !email::is_valid_email(&input.email) {
            return Err(WorkflowError::field("email", "Invalid email format"));
        }
        let email = email::normalize_email(&input.email);
        password::validate_password_strength(&input.password)?;
        let password_hash = password::hash_password(&input.password)?;

        let mut tx = self.pool.begin().await?;
        let organization_id = match organization::insert(&mut *tx, &org_acronym, &org_name, &email).await {
            Ok(id) => id,
            Err(DatabaseError::Duplicate(_)) => {
                return Err(WorkflowError::Conflict(format!(
                    "Organization acronym '{}' is already taken",
                    org_acronym
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let admin_id = match admin::insert(&mut *tx, organization_id, &email, &password_hash).await {
            Ok(id) => id,
            Err(DatabaseError::Duplicate(_)) => {
                return Err(WorkflowError::Conflict("Email is already in use".to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;

        tracing::info!(admin_id, organization_id, acronym = %org_acronym, "Admin account created");
        Ok(CreatedAdmin {
            admin_id,
            organization_id,
            email,
            org_acronym,
        })
    }

    pub async fn list_admins(&self) -> Result<Vec<AdminListing>, WorkflowError> {
        Ok(admin::list_with_organization(&self.pool).await?)
    }

    pub async fn set_admin_status(&self, id: i64, status: &str) -> Result<(), WorkflowError> {
        let status: AdminStatus = status.parse().map_err(|e: String| WorkflowError::field("status", e))?;
        admin::set_status(&self.pool, id, status).await?;
        tracing::info!(admin_id = id, status = status.as_str(), "Admin status changed");
        Ok(())
    }

    pub async fn delete_admin(&self, id: i64) -> Result<(), WorkflowError> {
        admin::delete(&self.pool, id).await?;
        tracing::info!(admin_id = id, "Admin deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_acronyms() {
        assert_eq!(validate_acronym(" JPCS ").unwrap(), "JPCS");
        assert!(validate_acronym("FAITH-CSC").is_ok());
    }

    #[test]
    fn rejects_bad_acronyms() {
        assert!(validate_acronym("").is_err());
        assert!(validate_acronym("J P C S").is_err());
        assert!(validate_acronym(&"A".repeat(21)).is_err());
    }
}
