pub mod password;
pub mod token;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::config;

/// Account kinds that can hold a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id within the role's table
    pub sub: i64,
    pub role: Role,
    pub email: String,
    pub organization_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: i64, role: Role, email: impl Into<String>, organization_id: Option<i64>) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            role,
            email: email.into(),
            organization_id,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn expires_in(&self) -> i64 {
        self.exp - self.iat
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unknown role '{0}'")]
    UnknownRole(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("{0}")]
    WeakPassword(String),
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    encode_with_secret(claims, &config::config().security.jwt_secret)
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    decode_with_secret(token, &config::config().security.jwt_secret)
}

fn encode_with_secret(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

fn decode_with_secret(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: 12,
            role: Role::Admin,
            email: "admin@jpcs.org".to_string(),
            organization_id: Some(3),
            exp: now + exp_offset,
            iat: now,
        }
    }

    #[test]
    fn round_trips_claims() {
        let token = encode_with_secret(&claims(3600), "secret").unwrap();
        let decoded = decode_with_secret(&token, "secret").unwrap();
        assert_eq!(decoded.sub, 12);
        assert_eq!(decoded.role, Role::Admin);
        assert_eq!(decoded.organization_id, Some(3));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = encode_with_secret(&claims(3600), "secret").unwrap();
        assert!(matches!(decode_with_secret(&token, "other"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        // Beyond the default 60s leeway
        let token = encode_with_secret(&claims(-3600), "secret").unwrap();
        assert!(matches!(decode_with_secret(&token, "secret"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(encode_with_secret(&claims(60), ""), Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn parses_roles() {
        assert_eq!("superadmin".parse::<Role>().unwrap(), Role::Superadmin);
        assert!("root".parse::<Role>().is_err());
    }
}
