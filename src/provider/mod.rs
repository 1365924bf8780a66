// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # External Identity Provider and Data Store
//!
//! The gateway never stores passwords or profiles itself. Credential
//! checks and account creation go to an [`IdentityProvider`]; profile rows
//! live in a [`ProfileStore`]. Production wires both to [`SupabaseClient`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

pub mod supabase;

#[cfg(test)]
pub mod memory;

pub use supabase::SupabaseClient;

/// Account record owned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Opaque identifier assigned by the provider
    pub id: String,
    /// Email registered with the provider
    pub email: String,
}

/// Account creation request forwarded to the provider.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub user_metadata: Map<String, Value>,
    pub app_metadata: Map<String, Value>,
}

/// One row of the profile table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub nombre_completo: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a client error.
    #[error("provider rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Transport failure, timeout, or server error on the provider side.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider response was invalid: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether a rejection means the account already exists.
    pub fn is_duplicate_account(&self) -> bool {
        match self {
            ProviderError::Rejected { code, message, .. } => {
                let code_matches = matches!(
                    code.as_deref(),
                    Some("email_exists") | Some("user_already_exists")
                );
                code_matches || is_duplicate_message(message)
            }
            _ => false,
        }
    }
}

fn is_duplicate_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["already exists", "already been registered", "already registered", "duplicate"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Run a provider call with an upper bound on its latency.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| Err(ProviderError::Unavailable(format!("timed out after {limit:?}"))))
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check an email/password pair. Email arrives already normalized.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    async fn create_user(&self, account: &NewAccount) -> Result<Identity, ProviderError>;

    /// Delete an account by id. Used to undo a registration that could not finish.
    async fn delete_user(&self, identity_id: &str) -> Result<(), ProviderError>;

    async fn health(&self) -> Result<(), ProviderError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// All rows whose id matches. Callers decide what a count other than one means.
    async fn find_profiles(&self, identity_id: &str) -> Result<Vec<ProfileRow>, ProviderError>;

    /// Insert the row, or merge into an existing row with the same id.
    async fn upsert_profile(&self, row: &ProfileRow) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(code: Option<&str>, message: &str) -> ProviderError {
        ProviderError::Rejected {
            status: 422,
            code: code.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn detects_duplicate_accounts_by_message() {
        assert!(rejected(None, "A user with this email address has already been registered")
            .is_duplicate_account());
        assert!(rejected(None, "User already exists").is_duplicate_account());
        assert!(rejected(None, "duplicate key value violates unique constraint").is_duplicate_account());
        assert!(!rejected(None, "Password should be at least 6 characters").is_duplicate_account());
    }

    #[test]
    fn detects_duplicate_accounts_by_code() {
        assert!(rejected(Some("email_exists"), "whatever").is_duplicate_account());
        assert!(!rejected(Some("weak_password"), "whatever").is_duplicate_account());
    }

    #[tokio::test(start_paused = true)]
    async fn with_timeout_turns_slow_calls_into_unavailable() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, ProviderError>(())
        };
        let err = with_timeout(Duration::from_secs(1), slow).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));

        let fast = async { Ok::<_, ProviderError>(7) };
        assert_eq!(with_timeout(Duration::from_secs(1), fast).await, Ok(7));
    }

    #[test]
    fn unavailable_is_never_duplicate() {
        assert!(!ProviderError::Unavailable("already exists".into()).is_duplicate_account());
    }
}
