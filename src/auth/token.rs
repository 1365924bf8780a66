// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 session token issuance and verification.
//!
//! Both halves take the [`SigningSecret`] as an explicit dependency so
//! tests can run with fixture secrets.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use super::{AuthError, Claims};
use crate::config::{ConfigError, JWT_SECRET_ENV};

/// Fixed token lifetime: one day.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

const BEARER_PREFIX: &str = "Bearer ";

/// Shared symmetric secret, validated once at startup.
#[derive(Debug)]
pub struct SigningSecret(SecretString);

impl SigningSecret {
    /// Blank secrets are rejected so the process refuses to start.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigError::Missing(JWT_SECRET_ENV));
        }
        Ok(Self(SecretString::from(secret)))
    }

    fn bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

/// A freshly signed token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub claims: Claims,
}

/// Builds and signs claim sets.
#[derive(Clone)]
pub struct TokenIssuer {
    key: Arc<EncodingKey>,
}

impl TokenIssuer {
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            key: Arc::new(EncodingKey::from_secret(secret.bytes())),
        }
    }

    /// Issue a token valid for [`TOKEN_TTL_SECS`] from now.
    pub fn issue(
        &self,
        identity_id: &str,
        email: &str,
        display_name: Option<&str>,
        role: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity_id, email, display_name, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        identity_id: &str,
        email: &str,
        display_name: Option<&str>,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let issued_at = now.timestamp();
        let claims = Claims {
            identity_id: identity_id.to_string(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            role: role.to_string(),
            issued_at,
            expires_at: issued_at + TOKEN_TTL_SECS,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::InternalError(format!("failed to encode token: {e}")))?;

        Ok(IssuedToken {
            access_token,
            claims,
        })
    }
}

/// Verifies signature and expiry of presented tokens. Pure and side-effect free.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenVerifier {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            key: Arc::new(DecodingKey::from_secret(secret.bytes())),
            validation: Arc::new(validation),
        }
    }

    /// Verify a bare token string.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }

    /// Verify the raw value of an `Authorization` header.
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let token = bearer_token(header)?;
        self.verify(token)
    }
}

/// Extract the token from `Bearer <token>`.
///
/// Absent header, wrong scheme, or empty token all mean no token was presented.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingAuthHeader)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}
