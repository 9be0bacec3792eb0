pub mod email_change_service;
pub mod highlight_service;
pub mod news_service;
pub mod organization_service;
pub mod program_service;
pub mod session_service;
pub mod submission_service;
pub mod subscription_service;

use thiserror::Error;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::email::EmailError;

pub use email_change_service::EmailChangeService;
pub use highlight_service::HighlightService;
pub use news_service::NewsService;
pub use organization_service::OrganizationService;
pub use program_service::ProgramService;
pub use session_service::SessionService;
pub use submission_service::SubmissionService;
pub use subscription_service::SubscriptionService;

/// Business-rule failures shared by the workflow services
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("{field}: {message}")]
    Field { field: String, message: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyAttempts(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Email(#[from] EmailError),
}

impl WorkflowError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::Field {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::Database(DatabaseError::from(err))
    }
}

/// Required, trimmed, non-empty text input
pub(crate) fn required(field: &str, value: &str) -> Result<String, WorkflowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorkflowError::field(field, format!("{} is required", field)));
    }
    Ok(value.to_string())
}
