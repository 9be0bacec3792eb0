use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use sqlx::MySqlPool;
use std::sync::Arc;

use super::session_service::LoginResponse;
use super::WorkflowError;
use crate::app::AppState;
use crate::auth::{password, token, Claims, Role};
use crate::config;
use crate::database::models::email_change::{self, EmailChangeRequest};
use crate::database::models::{admin, superadmin};
use crate::database::DatabaseError;
use crate::email::{self, templates, Mailer};

/// Outcome of comparing a submitted code against a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OtpCheck {
    Expired,
    Locked,
    Mismatch,
    Match,
}

fn check_otp(request: &EmailChangeRequest, otp: &str, now: DateTime<Utc>, max_attempts: i32) -> OtpCheck {
    if token::is_expired(request.expires_at, now) {
        OtpCheck::Expired
    } else if request.attempts >= max_attempts {
        OtpCheck::Locked
    } else if token::hash_token(otp) != request.otp_hash {
        OtpCheck::Mismatch
    } else {
        OtpCheck::Match
    }
}

fn locked() -> WorkflowError {
    WorkflowError::TooManyAttempts("Too many incorrect attempts, please request a new code".to_string())
}

struct AccountSnapshot {
    email: String,
    password_hash: String,
    organization_id: Option<i64>,
}

pub struct EmailChangeService {
    pool: MySqlPool,
    mailer: Arc<dyn Mailer>,
}

impl EmailChangeService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            mailer: state.mailer.clone(),
        }
    }

    async fn account(&self, role: Role, account_id: i64) -> Result<AccountSnapshot, WorkflowError> {
        let snapshot = match role {
            Role::Admin => admin::find_by_id(&self.pool, account_id).await?.map(|a| AccountSnapshot {
                email: a.email,
                password_hash: a.password_hash,
                organization_id: Some(a.organization_id),
            }),
            Role::Superadmin => superadmin::find_by_id(&self.pool, account_id).await?.map(|s| AccountSnapshot {
                email: s.email,
                password_hash: s.password_hash,
                organization_id: None,
            }),
        };
        snapshot.ok_or_else(|| WorkflowError::NotFound("Account not found".to_string()))
    }

    async fn email_in_use(&self, email: &str) -> Result<bool, WorkflowError> {
        Ok(admin::find_by_email(&self.pool, email).await?.is_some()
            || superadmin::find_by_email(&self.pool, email).await?.is_some())
    }

    /// Start an email change: confirm the password, then mail a one-time code to the new address
    pub async fn request(
        &self,
        role: Role,
        account_id: i64,
        new_email: &str,
        password_input: &str,
    ) -> Result<(), WorkflowError> {
        if !email::is_valid_email(new_email) {
            return Err(WorkflowError::field("new_email", "Invalid email format"));
        }
        let new_email = email::normalize_email(new_email);
        let account = self.account(role, account_id).await?;

        if !password::verify_password(password_input, &account.password_hash)? {
            return Err(WorkflowError::Unauthorized("Password is incorrect".to_string()));
        }
        if account.email.eq_ignore_ascii_case(&new_email) {
            return Err(WorkflowError::Validation(
                "New email must differ from the current email".to_string(),
            ));
        }
        if self.email_in_use(&new_email).await? {
            return Err(WorkflowError::Conflict("Email is already in use".to_string()));
        }

        let ttl_minutes = config::config().tokens.otp_ttl_minutes;
        let otp = token::generate_otp();
        let expires_at = Utc::now() + Duration::minutes(ttl_minutes);

        let mut tx = self.pool.begin().await?;
        email_change::invalidate_pending(&mut *tx, role, account_id).await?;
        email_change::insert(&mut *tx, role, account_id, &new_email, &token::hash_token(&otp), expires_at).await?;
        tx.commit().await?;

        self.mailer
            .send(templates::email_change_otp(&new_email, &otp, ttl_minutes))
            .await?;

        tracing::info!(role = %role, account_id, "Email change code sent");
        Ok(())
    }

    /// Finish an email change with the mailed code and return a token carrying the new address
    pub async fn verify(&self, role: Role, account_id: i64, otp: &str) -> Result<LoginResponse, WorkflowError> {
        let request = email_change::find_pending(&self.pool, role, account_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("No pending email change request".to_string()))?;

        let max_attempts = config::config().tokens.otp_max_attempts;
        let outcome = match check_otp(&request, otp.trim(), Utc::now(), max_attempts) {
            OtpCheck::Expired => {
                return Err(WorkflowError::Validation(
                    "Verification code has expired, please request a new one".to_string(),
                ));
            }
            OtpCheck::Locked => return Err(locked()),
            outcome => outcome,
        };

        // The row we read may already be stale; the claim is what enforces the cap
        if !email_change::claim_attempt(&self.pool, request.id, max_attempts).await? {
            return Err(locked());
        }
        if outcome == OtpCheck::Mismatch {
            let remaining = (max_attempts - request.attempts - 1).max(0);
            tracing::warn!(role = %role, account_id, remaining, "Incorrect email change code");
            return Err(WorkflowError::Validation(format!(
                "Invalid verification code, {} attempt(s) remaining",
                remaining
            )));
        }

        let mut tx = self.pool.begin().await?;
        if !email_change::consume(&mut *tx, request.id).await? {
            return Err(WorkflowError::NotFound("No pending email change request".to_string()));
        }
        let updated = match role {
            Role::Admin => admin::update_email(&mut *tx, account_id, &request.new_email).await,
            Role::Superadmin => superadmin::update_email(&mut *tx, account_id, &request.new_email).await,
        };
        match updated {
            Ok(()) => {}
            Err(DatabaseError::Duplicate(_)) => {
                return Err(WorkflowError::Conflict("Email is already in use".to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;

        tracing::info!(role = %role, account_id, "Email address changed");

        let account = self.account(role, account_id).await?;
        let claims = Claims::new(account_id, role, account.email.clone(), account.organization_id);
        LoginResponse::issue(
            claims,
            json!({
                "id": account_id,
                "email": account.email,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(otp: &str, attempts: i32, expires_in_minutes: i64) -> EmailChangeRequest {
        let now = Utc::now();
        EmailChangeRequest {
            id: 1,
            account_role: "admin".to_string(),
            account_id: 4,
            new_email: "new@org.ph".to_string(),
            otp_hash: token::hash_token(otp),
            attempts,
            expires_at: now + Duration::minutes(expires_in_minutes),
            consumed_at: None,
            created_at: now,
        }
    }

    #[test]
    fn correct_code_matches() {
        assert_eq!(check_otp(&pending("123456", 0, 10), "123456", Utc::now(), 5), OtpCheck::Match);
    }

    #[test]
    fn wrong_code_is_a_mismatch() {
        assert_eq!(check_otp(&pending("123456", 2, 10), "654321", Utc::now(), 5), OtpCheck::Mismatch);
    }

    #[test]
    fn expiry_wins_over_everything() {
        assert_eq!(check_otp(&pending("123456", 9, -1), "123456", Utc::now(), 5), OtpCheck::Expired);
    }

    #[test]
    fn lockout_maps_to_too_many_requests() {
        assert_eq!(crate::error::ApiError::from(locked()).status_code(), axum::http::StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn exhausted_attempts_lock_even_the_right_code() {
        assert_eq!(check_otp(&pending("123456", 5, 10), "123456", Utc::now(), 5), OtpCheck::Locked);
    }
}
