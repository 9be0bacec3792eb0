//! Outbound email. Handlers depend on the [`Mailer`] trait only; the SMTP
//! transport is chosen at startup and a log-only mailer stands in when no
//! SMTP host is configured.

pub mod smtp;
pub mod templates;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::EmailConfig;

pub use smtp::SmtpMailer;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// A plain-text message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        tracing::info!(to = %message.to, subject = %message.subject, "Email delivery disabled, message logged");
        tracing::debug!(body = %message.body, "Logged email body");
        Ok(())
    }
}

/// SMTP when a host is configured, otherwise log-only
pub fn mailer_from_config(config: &EmailConfig) -> Result<Arc<dyn Mailer>, EmailError> {
    if config.smtp_host.is_empty() {
        tracing::warn!("SMTP_HOST not set, outgoing email will only be logged");
        return Ok(Arc::new(LogMailer));
    }
    Ok(Arc::new(SmtpMailer::new(config)?))
}

/// Minimal shape check applied before anything reaches the database or SMTP
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Lowercased, trimmed form used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("juan.delacruz@example.org"));
        assert!(is_valid_email("  jpcs@school.edu.ph "));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plainaddress", "@example.org", "a@b", "a@@b.org", "a b@c.org", "a@.org", "a@org."] {
            assert!(!is_valid_email(bad), "{} should be rejected", bad);
        }
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email(" Juan@Example.ORG "), "juan@example.org");
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let message = EmailMessage {
            to: "a@b.org".to_string(),
            subject: "Hi".to_string(),
            body: "Body".to_string(),
        };
        assert!(LogMailer.send(message).await.is_ok());
    }

    #[test]
    fn empty_smtp_host_falls_back_to_log_mailer() {
        let config = EmailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "noreply@example.org".to_string(),
        };
        assert!(mailer_from_config(&config).is_ok());
    }
}
