//! Approval workflow for changes proposed by organization admins.
//!
//! An admin proposes new values for a whitelisted set of fields. The server
//! snapshots the current values of exactly those fields as `previous_data`,
//! so a reviewer sees a field-by-field diff. Approval re-reads the target row
//! inside a transaction and refuses to apply a proposal whose snapshot no
//! longer matches the row.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{MySql, MySqlPool, Transaction};
use std::str::FromStr;
use std::sync::Arc;

use super::WorkflowError;
use crate::app::AppState;
use crate::database::models::notification::{self, NewNotification, Recipient};
use crate::database::models::program::ProgramStatus;
use crate::database::models::submission::{self, NewSubmission, Submission, SubmissionListing, SubmissionStatus};
use crate::database::models::{admin, organization, program};
use crate::database::{compute_diff, FieldChange, QueryBuilder};
use crate::email::{self, templates, Mailer};

/// Part of an organization's data a submission may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Organization,
    Program,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Organization => "organization",
            Section::Program => "program",
        }
    }

    fn table(&self) -> &'static str {
        match self {
            Section::Organization => "organizations",
            Section::Program => "programs",
        }
    }

    /// Columns a proposal may touch
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Section::Organization => &["name", "description", "email", "phone", "facebook", "org_color", "logo"],
            Section::Program => &["title", "description", "category", "status", "event_date"],
        }
    }

    /// Columns a new record must be given
    fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Section::Organization => &["name"],
            Section::Program => &["title"],
        }
    }

    /// NOT NULL columns: a proposal may change them but never clear them
    fn not_null_fields(&self) -> &'static [&'static str] {
        match self {
            Section::Organization => &["name"],
            Section::Program => &["title", "status"],
        }
    }
}

impl FromStr for Section {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organization" => Ok(Section::Organization),
            "program" => Ok(Section::Program),
            other => Err(WorkflowError::field("section", format!("Unknown section '{}'", other))),
        }
    }
}

/// Check a proposal against the section whitelist and per-field rules.
/// `creating` additionally requires every required field to be present.
pub fn validate_proposal(section: Section, proposed: &Value, creating: bool) -> Result<Map<String, Value>, WorkflowError> {
    let fields = proposed
        .as_object()
        .ok_or_else(|| WorkflowError::Validation("Proposed data must be a JSON object".to_string()))?;

    if fields.is_empty() {
        return Err(WorkflowError::Validation("Proposed data is empty".to_string()));
    }

    let mut cleaned = Map::new();
    for (key, value) in fields {
        if !section.fields().contains(&key.as_str()) {
            return Err(WorkflowError::Validation(format!(
                "Field '{}' cannot be changed through a {} submission",
                key,
                section.as_str()
            )));
        }

        let value = match value {
            Value::Null => Value::Null,
            Value::String(s) => Value::String(s.trim().to_string()),
            _ => return Err(WorkflowError::field(key.clone(), "must be a string or null")),
        };

        let blank = value.as_str().map_or(true, str::is_empty);
        if blank && section.not_null_fields().contains(&key.as_str()) {
            return Err(WorkflowError::field(key.clone(), format!("{} cannot be empty", key)));
        }

        if let Some(text) = value.as_str().filter(|s| !s.is_empty()) {
            validate_field_value(key, text)?;
        }

        // Blank optional text clears the column
        let value = if blank { Value::Null } else { value };
        cleaned.insert(key.clone(), value);
    }

    if creating {
        for required in section.required_fields() {
            if !cleaned.contains_key(*required) {
                return Err(WorkflowError::field(*required, format!("{} is required", required)));
            }
        }
    }

    Ok(cleaned)
}

fn validate_field_value(field: &str, value: &str) -> Result<(), WorkflowError> {
    match field {
        "email" if !email::is_valid_email(value) => Err(WorkflowError::field("email", "Invalid email format")),
        "status" => value
            .parse::<ProgramStatus>()
            .map(|_| ())
            .map_err(|e| WorkflowError::field("status", e)),
        "event_date" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| WorkflowError::field("event_date", "must be a date in YYYY-MM-DD format")),
        "org_color" if !is_hex_color(value) => Err(WorkflowError::field("org_color", "must be a hex color like #1a2b3c")),
        _ => Ok(()),
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Current values of the given fields, read from a serialized row
fn snapshot(row: &Value, fields: impl IntoIterator<Item = impl AsRef<str>>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|field| {
            let field = field.as_ref();
            (field.to_string(), row.get(field).cloned().unwrap_or(Value::Null))
        })
        .collect()
}

fn as_map(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

/// A submission together with its field-by-field diff
#[derive(Debug, Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    pub changes: Vec<FieldChange>,
}

impl From<Submission> for SubmissionDetail {
    fn from(submission: Submission) -> Self {
        let changes = compute_diff(&as_map(&submission.previous_data), &as_map(&submission.proposed_data));
        Self { submission, changes }
    }
}

pub struct NewProposal {
    pub section: String,
    pub record_id: Option<i64>,
    pub proposed_data: Value,
}

pub struct SubmissionService {
    pool: MySqlPool,
    mailer: Arc<dyn Mailer>,
}

impl SubmissionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            mailer: state.mailer.clone(),
        }
    }

    /// Serialized current row of the target, scoped to the admin's organization
    async fn current_row(
        &self,
        section: Section,
        organization_id: i64,
        record_id: i64,
    ) -> Result<Value, WorkflowError> {
        let row = match section {
            Section::Organization => organization::find_by_id(&self.pool, record_id)
                .await?
                .filter(|org| org.id == organization_id)
                .map(serde_json::to_value),
            Section::Program => program::find_by_id(&self.pool, record_id)
                .await?
                .filter(|p| p.organization_id == organization_id)
                .map(serde_json::to_value),
        };

        match row {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(WorkflowError::Validation(format!("Unreadable record: {}", e))),
            None => Err(WorkflowError::NotFound(format!("{} {} not found", section.as_str(), record_id))),
        }
    }

    pub async fn submit(
        &self,
        admin_id: i64,
        organization_id: i64,
        proposal: NewProposal,
    ) -> Result<SubmissionDetail, WorkflowError> {
        let section: Section = proposal.section.trim().parse()?;

        let record_id = match section {
            Section::Organization => match proposal.record_id {
                Some(id) if id != organization_id => {
                    return Err(WorkflowError::Forbidden(
                        "Admins can only propose changes to their own organization".to_string(),
                    ));
                }
                _ => Some(organization_id),
            },
            Section::Program => proposal.record_id,
        };

        let proposed = validate_proposal(section, &proposal.proposed_data, record_id.is_none())?;

        let previous = match record_id {
            Some(id) => snapshot(&self.current_row(section, organization_id, id).await?, proposed.keys()),
            None => Map::new(),
        };

        if !compute_diff(&previous, &proposed).iter().any(FieldChange::is_change) {
            return Err(WorkflowError::Validation(
                "Proposed data does not change anything".to_string(),
            ));
        }

        let previous_data = Value::Object(previous);
        let proposed_data = Value::Object(proposed);

        let mut tx = self.pool.begin().await?;
        let id = submission::insert(
            &mut *tx,
            NewSubmission {
                organization_id,
                submitted_by: admin_id,
                section: section.as_str(),
                record_id,
                previous_data: &previous_data,
                proposed_data: &proposed_data,
            },
        )
        .await?;

        let message = format!("New {} submission #{} awaits review", section.as_str(), id);
        let link = format!("/superadmin/submissions/{}", id);
        notification::insert(
            &mut *tx,
            NewNotification {
                recipient: Recipient::AllSuperadmins,
                kind: "submission_created",
                message: &message,
                link: Some(&link),
            },
        )
        .await?;

        let created = submission::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Submission {} not found", id)))?;
        tx.commit().await?;

        tracing::info!(submission_id = id, admin_id, section = section.as_str(), "Submission created");
        Ok(created.into())
    }

    pub async fn list_for_organization(&self, organization_id: i64) -> Result<Vec<SubmissionListing>, WorkflowError> {
        Ok(submission::list_by_organization(&self.pool, organization_id).await?)
    }

    pub async fn list(&self, status: Option<&str>) -> Result<Vec<SubmissionListing>, WorkflowError> {
        let status = status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<SubmissionStatus>().map_err(|e| WorkflowError::field("status", e)))
            .transpose()?;
        Ok(submission::list(&self.pool, status).await?)
    }

    /// Fetch with diff; `organization_id` restricts visibility for admins
    pub async fn get(&self, id: i64, organization_id: Option<i64>) -> Result<SubmissionDetail, WorkflowError> {
        let found = submission::find_by_id(&self.pool, id)
            .await?
            .filter(|s| organization_id.map_or(true, |org| s.organization_id == org))
            .ok_or_else(|| WorkflowError::NotFound(format!("Submission {} not found", id)))?;
        Ok(found.into())
    }

    /// Lock a submission and make sure it may still move to `next`
    async fn lock_pending(
        tx: &mut Transaction<'static, MySql>,
        id: i64,
        organization_id: Option<i64>,
        next: SubmissionStatus,
    ) -> Result<Submission, WorkflowError> {
        let locked = submission::find_for_update(&mut **tx, id)
            .await?
            .filter(|s| organization_id.map_or(true, |org| s.organization_id == org))
            .ok_or_else(|| WorkflowError::NotFound(format!("Submission {} not found", id)))?;

        let status: SubmissionStatus = locked
            .status
            .parse()
            .map_err(|e: String| WorkflowError::Validation(e))?;
        if !status.can_transition_to(next) {
            return Err(WorkflowError::Conflict(format!("Submission is already {}", status.as_str())));
        }
        Ok(locked)
    }

    pub async fn approve(&self, superadmin_id: i64, id: i64) -> Result<SubmissionDetail, WorkflowError> {
        let mut tx = self.pool.begin().await?;
        let pending = Self::lock_pending(&mut tx, id, None, SubmissionStatus::Approved).await?;
        let section: Section = pending.section.parse()?;
        let proposed = as_map(&pending.proposed_data);

        let record_id = match pending.record_id {
            Some(record_id) => {
                let current = match section {
                    Section::Organization => organization::find_by_id_for_update(&mut *tx, record_id)
                        .await?
                        .map(serde_json::to_value)
                        .transpose()
                        .map_err(|e| WorkflowError::Validation(e.to_string()))?,
                    Section::Program => program::find_by_id_for_update(&mut *tx, record_id)
                        .await?
                        .map(serde_json::to_value)
                        .transpose()
                        .map_err(|e| WorkflowError::Validation(e.to_string()))?,
                }
                .ok_or_else(|| WorkflowError::Conflict("The record this submission changes no longer exists".to_string()))?;

                let previous = as_map(&pending.previous_data);
                let now = snapshot(&current, previous.keys());
                if compute_diff(&previous, &now).iter().any(FieldChange::is_change) {
                    return Err(WorkflowError::Conflict(
                        "The record changed after this submission was made; ask the admin to resubmit".to_string(),
                    ));
                }

                QueryBuilder::from_fields(section.table(), section.fields(), &proposed)?
                    .update(&mut *tx, record_id)
                    .await?;
                record_id
            }
            None => {
                let created = QueryBuilder::from_fields(section.table(), section.fields(), &proposed)?
                    .set("organization_id", pending.organization_id)
                    .insert(&mut *tx)
                    .await?;
                submission::set_record_id(&mut *tx, id, created).await?;
                created
            }
        };

        if !submission::close(&mut *tx, id, SubmissionStatus::Approved, Some(superadmin_id), None).await? {
            return Err(WorkflowError::Conflict("Submission was reviewed concurrently".to_string()));
        }

        let message = format!("Your {} submission #{} was approved", section.as_str(), id);
        let link = format!("/admin/submissions/{}", id);
        notification::insert(
            &mut *tx,
            NewNotification {
                recipient: Recipient::Admin(pending.submitted_by),
                kind: "submission_approved",
                message: &message,
                link: Some(&link),
            },
        )
        .await?;

        let approved = submission::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Submission {} not found", id)))?;
        tx.commit().await?;

        tracing::info!(submission_id = id, superadmin_id, record_id, "Submission approved");
        self.notify_by_email(pending.submitted_by, |to| templates::submission_approved(to, section.as_str(), id))
            .await;

        Ok(approved.into())
    }

    pub async fn reject(&self, superadmin_id: i64, id: i64, remarks: &str) -> Result<SubmissionDetail, WorkflowError> {
        let remarks = super::required("remarks", remarks)?;

        let mut tx = self.pool.begin().await?;
        let pending = Self::lock_pending(&mut tx, id, None, SubmissionStatus::Rejected).await?;

        if !submission::close(&mut *tx, id, SubmissionStatus::Rejected, Some(superadmin_id), Some(&remarks)).await? {
            return Err(WorkflowError::Conflict("Submission was reviewed concurrently".to_string()));
        }

        let message = format!("Your {} submission #{} was rejected: {}", pending.section, id, remarks);
        let link = format!("/admin/submissions/{}", id);
        notification::insert(
            &mut *tx,
            NewNotification {
                recipient: Recipient::Admin(pending.submitted_by),
                kind: "submission_rejected",
                message: &message,
                link: Some(&link),
            },
        )
        .await?;

        let rejected = submission::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Submission {} not found", id)))?;
        tx.commit().await?;

        tracing::info!(submission_id = id, superadmin_id, "Submission rejected");
        self.notify_by_email(pending.submitted_by, |to| {
            templates::submission_rejected(to, &pending.section, id, &remarks)
        })
        .await;

        Ok(rejected.into())
    }

    /// Withdraw a pending submission of the admin's own organization
    pub async fn cancel(&self, admin_id: i64, organization_id: i64, id: i64) -> Result<SubmissionDetail, WorkflowError> {
        let mut tx = self.pool.begin().await?;
        let pending = Self::lock_pending(&mut tx, id, Some(organization_id), SubmissionStatus::Cancelled).await?;

        if !submission::close(&mut *tx, id, SubmissionStatus::Cancelled, None, None).await? {
            return Err(WorkflowError::Conflict("Submission was reviewed concurrently".to_string()));
        }

        let message = format!("{} submission #{} was withdrawn by its organization", pending.section, id);
        notification::insert(
            &mut *tx,
            NewNotification {
                recipient: Recipient::AllSuperadmins,
                kind: "submission_cancelled",
                message: &message,
                link: None,
            },
        )
        .await?;

        let cancelled = submission::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Submission {} not found", id)))?;
        tx.commit().await?;

        tracing::info!(submission_id = id, admin_id, "Submission cancelled");
        Ok(cancelled.into())
    }

    /// Best effort; the in-app notification is already committed
    async fn notify_by_email(&self, admin_id: i64, build: impl FnOnce(&str) -> email::EmailMessage) {
        match admin::find_by_id(&self.pool, admin_id).await {
            Ok(Some(account)) => {
                if let Err(e) = self.mailer.send(build(&account.email)).await {
                    tracing::warn!(admin_id, "Failed to email submission outcome: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(admin_id, "Failed to load admin for submission email: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_sections_only() {
        assert_eq!("organization".parse::<Section>().unwrap(), Section::Organization);
        assert_eq!("program".parse::<Section>().unwrap(), Section::Program);
        assert!("news".parse::<Section>().is_err());
    }

    #[test]
    fn rejects_empty_proposal() {
        let err = validate_proposal(Section::Organization, &json!({}), false).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn rejects_non_object_proposal() {
        assert!(validate_proposal(Section::Program, &json!(["title"]), false).is_err());
    }

    #[test]
    fn rejects_fields_outside_whitelist() {
        let err = validate_proposal(Section::Organization, &json!({ "status": "inactive" }), false).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(msg) if msg.contains("status")));

        let err = validate_proposal(Section::Program, &json!({ "organization_id": 2 }), false).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn trims_values_and_clears_blank_optional_fields() {
        let cleaned = validate_proposal(
            Section::Organization,
            &json!({ "name": "  Junior Philippine Computer Society ", "phone": "  " }),
            false,
        )
        .unwrap();
        assert_eq!(cleaned["name"], json!("Junior Philippine Computer Society"));
        assert_eq!(cleaned["phone"], Value::Null);
    }

    #[test]
    fn required_fields_cannot_be_blanked() {
        let err = validate_proposal(Section::Organization, &json!({ "name": "" }), false).unwrap_err();
        assert!(matches!(err, WorkflowError::Field { field, .. } if field == "name"));
    }

    #[test]
    fn program_status_cannot_be_cleared() {
        let err = validate_proposal(Section::Program, &json!({ "title": "Feeding", "status": "" }), true).unwrap_err();
        assert!(matches!(err, WorkflowError::Field { field, .. } if field == "status"));

        let err = validate_proposal(Section::Program, &json!({ "status": "  " }), false).unwrap_err();
        assert!(matches!(err, WorkflowError::Field { field, .. } if field == "status"));

        let err = validate_proposal(Section::Program, &json!({ "status": null }), false).unwrap_err();
        assert!(matches!(err, WorkflowError::Field { field, .. } if field == "status"));

        // Omitting status on creation leaves the column default in place
        let cleaned = validate_proposal(Section::Program, &json!({ "title": "Feeding", "category": "" }), true).unwrap();
        assert!(!cleaned.contains_key("status"));
        assert_eq!(cleaned["category"], Value::Null);
    }

    #[test]
    fn program_creation_needs_a_title() {
        let err = validate_proposal(Section::Program, &json!({ "category": "Outreach" }), true).unwrap_err();
        assert!(matches!(err, WorkflowError::Field { field, .. } if field == "title"));
        assert!(validate_proposal(Section::Program, &json!({ "title": "Feeding" }), true).is_ok());
    }

    #[test]
    fn validates_field_formats() {
        assert!(validate_proposal(Section::Program, &json!({ "status": "postponed" }), false).is_err());
        assert!(validate_proposal(Section::Program, &json!({ "event_date": "12/01/2024" }), false).is_err());
        assert!(validate_proposal(Section::Program, &json!({ "event_date": "2024-12-01" }), false).is_ok());
        assert!(validate_proposal(Section::Organization, &json!({ "email": "nope" }), false).is_err());
        assert!(validate_proposal(Section::Organization, &json!({ "org_color": "blue" }), false).is_err());
        assert!(validate_proposal(Section::Organization, &json!({ "org_color": "#1A2b3c" }), false).is_ok());
        assert!(validate_proposal(Section::Organization, &json!({ "phone": 917 }), false).is_err());
    }

    #[test]
    fn snapshot_takes_only_proposed_fields() {
        let row = json!({ "id": 3, "name": "JPCS", "phone": null, "status": "active" });
        let taken = snapshot(&row, ["name", "phone", "logo"]);
        assert_eq!(Value::Object(taken), json!({ "name": "JPCS", "phone": null, "logo": null }));
    }

    #[test]
    fn detail_includes_diff() {
        let now = chrono::Utc::now();
        let detail = SubmissionDetail::from(Submission {
            id: 1,
            organization_id: 2,
            submitted_by: 3,
            section: "organization".to_string(),
            record_id: Some(2),
            previous_data: json!({ "name": "Old" }),
            proposed_data: json!({ "name": "New" }),
            status: "pending".to_string(),
            remarks: None,
            reviewed_by: None,
            submitted_at: now,
            reviewed_at: None,
        });
        assert_eq!(detail.changes.len(), 1);
        assert!(detail.changes[0].is_change());

        let body = serde_json::to_value(&detail).unwrap();
        assert_eq!(body["section"], "organization");
        assert_eq!(body["changes"][0]["change_type"], "modified");
    }
}
