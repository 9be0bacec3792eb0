use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::MySqlPool;
use std::sync::Arc;

use super::WorkflowError;
use crate::app::AppState;
use crate::auth::{self, password, token, Claims, Role};
use crate::config;
use crate::database::models::{admin, organization, password_reset, superadmin};
use crate::email::{self, templates, Mailer};

const BAD_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub role: Role,
    pub user: Value,
}

impl LoginResponse {
    pub fn issue(claims: Claims, user: Value) -> Result<Self, WorkflowError> {
        let token = auth::generate_jwt(&claims)?;
        Ok(Self {
            token,
            token_type: "Bearer",
            expires_in: claims.expires_in(),
            role: claims.role,
            user,
        })
    }
}

pub struct SessionService {
    pool: MySqlPool,
    mailer: Arc<dyn Mailer>,
}

impl SessionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            mailer: state.mailer.clone(),
        }
    }

    pub async fn admin_login(&self, email: &str, password_input: &str) -> Result<LoginResponse, WorkflowError> {
        let email = email::normalize_email(email);
        let Some(account) = admin::find_by_email(&self.pool, &email).await? else {
            password::verify_dummy(password_input);
            return Err(WorkflowError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !password::verify_password(password_input, &account.password_hash)? {
            tracing::warn!(admin_id = account.id, "Admin login failed: wrong password");
            return Err(WorkflowError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        if !account.is_active() {
            return Err(WorkflowError::Forbidden("Account is inactive".to_string()));
        }

        let org = organization::find_by_id(&self.pool, account.organization_id)
            .await?
            .ok_or_else(|| WorkflowError::Forbidden("Organization no longer exists".to_string()))?;
        if !org.is_active() {
            return Err(WorkflowError::Forbidden("Organization is inactive".to_string()));
        }

        tracing::info!(admin_id = account.id, organization = %org.acronym, "Admin logged in");

        let claims = Claims::new(account.id, Role::Admin, account.email.clone(), Some(org.id));
        LoginResponse::issue(
            claims,
            json!({
                "id": account.id,
                "email": account.email,
                "organization": {
                    "id": org.id,
                    "acronym": org.acronym,
                    "name": org.name,
                }
            }),
        )
    }

    pub async fn superadmin_login(&self, login: &str, password_input: &str) -> Result<LoginResponse, WorkflowError> {
        let login = login.trim();
        let Some(account) = superadmin::find_by_login(&self.pool, login).await? else {
            password::verify_dummy(password_input);
            return Err(WorkflowError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !password::verify_password(password_input, &account.password_hash)? {
            tracing::warn!(superadmin_id = account.id, "Superadmin login failed: wrong password");
            return Err(WorkflowError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        tracing::info!(superadmin_id = account.id, "Superadmin logged in");

        let claims = Claims::new(account.id, Role::Superadmin, account.email.clone(), None);
        LoginResponse::issue(
            claims,
            json!({
                "id": account.id,
                "username": account.username,
                "email": account.email,
            }),
        )
    }

    /// Always succeeds from the caller's point of view so account existence is not revealed
    pub async fn forgot_password(&self, email: &str, role: Role) -> Result<(), WorkflowError> {
        let email = email::normalize_email(email);
        let account_id = match role {
            Role::Admin => admin::find_by_email(&self.pool, &email).await?.map(|a| a.id),
            Role::Superadmin => superadmin::find_by_email(&self.pool, &email).await?.map(|s| s.id),
        };

        let Some(account_id) = account_id else {
            tracing::debug!(role = %role, "Password reset requested for unknown account");
            return Ok(());
        };

        let ttl_minutes = config::config().tokens.password_reset_ttl_minutes;
        let raw_token = token::generate_token();
        let expires_at = Utc::now() + Duration::minutes(ttl_minutes);

        let mut tx = self.pool.begin().await?;
        password_reset::invalidate_for_account(&mut *tx, role, account_id).await?;
        password_reset::insert(&mut *tx, role, account_id, &token::hash_token(&raw_token), expires_at).await?;
        tx.commit().await?;

        let message = templates::password_reset(&email, &config::config().api.public_base_url, &raw_token, ttl_minutes);
        if let Err(e) = self.mailer.send(message).await {
            tracing::error!(role = %role, account_id, "Failed to send password reset email: {}", e);
        }
        Ok(())
    }

    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> Result<(), WorkflowError> {
        let invalid = || WorkflowError::Validation("Invalid or expired reset link".to_string());

        if !token::is_well_formed(raw_token) {
            return Err(invalid());
        }
        password::validate_password_strength(new_password)?;

        let reset = password_reset::find_by_hash(&self.pool, &token::hash_token(raw_token))
            .await?
            .ok_or_else(invalid)?;

        if reset.used_at.is_some() || token::is_expired(reset.expires_at, Utc::now()) {
            return Err(invalid());
        }

        let role: Role = reset.account_role.parse()?;
        let password_hash = password::hash_password(new_password)?;

        let mut tx = self.pool.begin().await?;
        if !password_reset::mark_used(&mut *tx, reset.id).await? {
            return Err(invalid());
        }
        let updated = match role {
            Role::Admin => admin::update_password(&mut *tx, reset.account_id, &password_hash).await?,
            Role::Superadmin => superadmin::update_password(&mut *tx, reset.account_id, &password_hash).await?,
        };
        // Account deleted after the link was issued; dropping tx rolls back mark_used
        if updated == 0 {
            return Err(invalid());
        }
        password_reset::invalidate_for_account(&mut *tx, role, reset.account_id).await?;
        tx.commit().await?;

        tracing::info!(role = %role, account_id = reset.account_id, "Password reset completed");
        Ok(())
    }

    /// Change password for a signed-in account after re-checking the current one
    pub async fn change_password(
        &self,
        role: Role,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), WorkflowError> {
        let stored_hash = match role {
            Role::Admin => admin::find_by_id(&self.pool, account_id).await?.map(|a| a.password_hash),
            Role::Superadmin => superadmin::find_by_id(&self.pool, account_id).await?.map(|s| s.password_hash),
        }
        .ok_or_else(|| WorkflowError::NotFound("Account not found".to_string()))?;

        if !password::verify_password(current_password, &stored_hash)? {
            return Err(WorkflowError::Unauthorized("Current password is incorrect".to_string()));
        }
        password::validate_password_strength(new_password)?;
        if current_password == new_password {
            return Err(WorkflowError::field(
                "new_password",
                "New password must differ from the current password",
            ));
        }

        let password_hash = password::hash_password(new_password)?;
        match role {
            Role::Admin => admin::update_password(&self.pool, account_id, &password_hash).await?,
            Role::Superadmin => superadmin::update_password(&self.pool, account_id, &password_hash).await?,
        };

        tracing::info!(role = %role, account_id, "Password changed");
        Ok(())
    }

    pub async fn admin_profile(&self, admin_id: i64) -> Result<Value, WorkflowError> {
        let account = admin::find_by_id(&self.pool, admin_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Admin not found".to_string()))?;
        let org = organization::find_by_id(&self.pool, account.organization_id).await?;

        Ok(json!({
            "id": account.id,
            "email": account.email,
            "status": account.status,
            "created_at": account.created_at,
            "organization": org,
        }))
    }

    pub async fn superadmin_profile(&self, superadmin_id: i64) -> Result<superadmin::Superadmin, WorkflowError> {
        superadmin::find_by_id(&self.pool, superadmin_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Superadmin not found".to_string()))
    }
}
