use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use std::sync::Arc;

use super::WorkflowError;
use crate::app::AppState;
use crate::auth::token;
use crate::config;
use crate::database::models::subscriber::{self, Subscriber};
use crate::database::DatabaseError;
use crate::email::{self, templates, Mailer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscribeOutcome {
    /// New unverified subscriber stored and confirmation sent
    Created,
    /// Address was pending; a fresh confirmation link was sent
    Resent,
}

pub struct SubscriptionService {
    pool: MySqlPool,
    mailer: Arc<dyn Mailer>,
}

impl SubscriptionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            mailer: state.mailer.clone(),
        }
    }

    pub async fn subscribe(&self, raw_email: &str) -> Result<SubscribeOutcome, WorkflowError> {
        if !email::is_valid_email(raw_email) {
            return Err(WorkflowError::field("email", "Invalid email format"));
        }
        let email = email::normalize_email(raw_email);
        let ttl_hours = config::config().tokens.subscription_ttl_hours;

        let verification_token = token::generate_token();
        let expires_at = Utc::now() + Duration::hours(ttl_hours);

        let (outcome, unsubscribe_token) = match subscriber::find_by_email(&self.pool, &email).await? {
            Some(existing) if existing.is_verified => {
                return Err(WorkflowError::Validation("This email is already subscribed".to_string()));
            }
            Some(existing) => {
                subscriber::rotate_verification(&self.pool, existing.id, &token::hash_token(&verification_token), expires_at)
                    .await?;
                // Raw unsubscribe token is unrecoverable from its digest
                tracing::info!(subscriber_id = existing.id, "Confirmation resent to pending subscriber");
                (SubscribeOutcome::Resent, None)
            }
            None => {
                let unsubscribe_token = token::generate_token();
                let inserted = subscriber::insert(
                    &self.pool,
                    &email,
                    &token::hash_token(&verification_token),
                    expires_at,
                    &token::hash_token(&unsubscribe_token),
                )
                .await;

                match inserted {
                    Ok(id) => {
                        tracing::info!(subscriber_id = id, "New subscriber pending confirmation");
                        (SubscribeOutcome::Created, Some(unsubscribe_token))
                    }
                    Err(DatabaseError::Duplicate(_)) => {
                        return Err(WorkflowError::Validation("This email is already subscribed".to_string()));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let base_url = &config::config().api.public_base_url;
        let message = match unsubscribe_token {
            Some(unsubscribe_token) => {
                templates::subscription_confirmation(&email, base_url, &verification_token, &unsubscribe_token, ttl_hours)
            }
            None => templates::subscription_reminder(&email, base_url, &verification_token, ttl_hours),
        };
        self.mailer.send(message).await?;

        Ok(outcome)
    }

    /// Verify the address behind a confirmation token. The token is cleared, so it works once.
    pub async fn confirm(&self, raw_token: &str) -> Result<Subscriber, WorkflowError> {
        let invalid = || WorkflowError::Validation("Invalid or already used confirmation link".to_string());

        if !token::is_well_formed(raw_token) {
            return Err(invalid());
        }

        let subscriber = subscriber::find_by_verification_hash(&self.pool, &token::hash_token(raw_token))
            .await?
            .ok_or_else(invalid)?;

        ensure_not_expired(subscriber.token_expires_at, Utc::now())?;

        subscriber::mark_verified(&self.pool, subscriber.id).await?;
        tracing::info!(subscriber_id = subscriber.id, "Subscription confirmed");

        Ok(Subscriber {
            is_verified: true,
            verified_at: Some(Utc::now()),
            verification_token_hash: None,
            token_expires_at: None,
            ..subscriber
        })
    }

    pub async fn unsubscribe(&self, raw_token: &str) -> Result<(), WorkflowError> {
        let not_found = || WorkflowError::NotFound("Subscription not found".to_string());

        if !token::is_well_formed(raw_token) {
            return Err(not_found());
        }

        let subscriber = subscriber::find_by_unsubscribe_hash(&self.pool, &token::hash_token(raw_token))
            .await?
            .ok_or_else(not_found)?;

        subscriber::delete(&self.pool, subscriber.id).await?;
        tracing::info!(subscriber_id = subscriber.id, "Subscriber removed");
        Ok(())
    }

    pub async fn list(&self, verified_only: bool) -> Result<Vec<Subscriber>, WorkflowError> {
        Ok(subscriber::list(&self.pool, verified_only).await?)
    }

    pub async fn remove(&self, id: i64) -> Result<(), WorkflowError> {
        Ok(subscriber::delete(&self.pool, id).await?)
    }
}

fn ensure_not_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<(), WorkflowError> {
    match expires_at {
        Some(expires_at) if !token::is_expired(expires_at, now) => Ok(()),
        _ => Err(WorkflowError::Validation(
            "Confirmation link has expired, please subscribe again".to_string(),
        )),
    }
}
