// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential validation against the identity provider.

use std::sync::Arc;
use std::time::Duration;

use crate::error::GatewayError;
use crate::provider::{with_timeout, Identity, IdentityProvider, ProviderError};

/// Trimmed, lowercased form used for every provider lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Return the value when present and not blank, else `MissingField(field)`.
pub fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, GatewayError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(GatewayError::MissingField(field))
}

/// Passwords are opaque: only absent or empty counts as missing.
pub fn required_password(value: Option<&str>) -> Result<&str, GatewayError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(GatewayError::MissingField("password"))
}

/// Delegates email/password checks to the identity provider.
#[derive(Clone)]
pub struct CredentialValidator {
    provider: Arc<dyn IdentityProvider>,
    timeout: Duration,
}

impl CredentialValidator {
    pub fn new(provider: Arc<dyn IdentityProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Missing fields short-circuit before the provider is contacted. The
    /// password is forwarded exactly as received.
    pub async fn validate(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Identity, GatewayError> {
        let email = normalize_email(required(email, "email")?);
        let password = required_password(password)?;

        let outcome = with_timeout(
            self.timeout,
            self.provider.sign_in_with_password(&email, password),
        )
        .await;

        match outcome {
            Ok(identity) => Ok(identity),
            Err(ProviderError::Rejected { message, .. }) => {
                tracing::debug!(%email, "identity provider rejected credentials");
                Err(GatewayError::InvalidCredentials(message))
            }
            Err(e) => Err(GatewayError::ProviderUnavailable(e.to_string())),
        }
    }
}
