// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory provider and profile store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Identity, IdentityProvider, NewAccount, ProfileRow, ProfileStore, ProviderError};

#[derive(Default)]
pub struct InMemoryProvider {
    accounts: RwLock<HashMap<String, (Identity, String)>>,
    profiles: RwLock<Vec<ProfileRow>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    down: bool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call fails as unreachable.
    pub fn unavailable() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }

    pub async fn insert_account(&self, id: &str, email: &str, password: &str) -> Identity {
        let identity = Identity {
            id: id.to_string(),
            email: email.to_string(),
        };
        self.accounts
            .write()
            .await
            .insert(email.to_string(), (identity.clone(), password.to_string()));
        identity
    }

    pub async fn insert_profile(&self, row: ProfileRow) {
        self.profiles.write().await.push(row);
    }

    pub async fn profile_rows(&self) -> Vec<ProfileRow> {
        self.profiles.read().await.clone()
    }

    /// Number of provider or store calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.down {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.enter().await?;
        match self.accounts.read().await.get(email) {
            Some((identity, stored)) if stored == password => Ok(identity.clone()),
            _ => Err(ProviderError::Rejected {
                status: 400,
                code: Some("invalid_credentials".to_string()),
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    async fn create_user(&self, account: &NewAccount) -> Result<Identity, ProviderError> {
        self.enter().await?;
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.email) {
            return Err(ProviderError::Rejected {
                status: 422,
                code: Some("email_exists".to_string()),
                message: "A user with this email address has already been registered".to_string(),
            });
        }
        if account.password.len() < 6 {
            return Err(ProviderError::Rejected {
                status: 422,
                code: Some("weak_password".to_string()),
                message: "Password should be at least 6 characters.".to_string(),
            });
        }
        let identity = Identity {
            id: format!("id-{}", accounts.len() + 1),
            email: account.email.clone(),
        };
        accounts.insert(
            account.email.clone(),
            (identity.clone(), account.password.clone()),
        );
        Ok(identity)
    }

    async fn delete_user(&self, identity_id: &str) -> Result<(), ProviderError> {
        self.enter().await?;
        self.accounts
            .write()
            .await
            .retain(|_, (identity, _)| identity.id != identity_id);
        Ok(())
    }

    async fn health(&self) -> Result<(), ProviderError> {
        self.enter().await
    }
}

#[async_trait]
impl ProfileStore for InMemoryProvider {
    async fn find_profiles(&self, identity_id: &str) -> Result<Vec<ProfileRow>, ProviderError> {
        self.enter().await?;
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .filter(|row| row.id == identity_id)
            .cloned()
            .collect())
    }

    async fn upsert_profile(&self, row: &ProfileRow) -> Result<(), ProviderError> {
        self.enter().await?;
        let mut profiles = self.profiles.write().await;
        match profiles.iter_mut().find(|existing| existing.id == row.id) {
            Some(existing) => *existing = row.clone(),
            None => profiles.push(row.clone()),
        }
        Ok(())
    }
}
