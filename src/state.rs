// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::service::AuthService;

/// Shared, read-only request state. The signing secret lives only inside
/// the issuer and verifier keys.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(auth: AuthService, verifier: TokenVerifier) -> Self {
        Self {
            auth: Arc::new(auth),
            verifier,
        }
    }
}

#[cfg(test)]
const TEST_SECRET: &str = "test-secret";

/// Issuer signing with the same fixture secret as [`test_state`].
#[cfg(test)]
pub(crate) fn test_issuer() -> crate::auth::TokenIssuer {
    use crate::auth::{SigningSecret, TokenIssuer};

    TokenIssuer::new(&SigningSecret::new(TEST_SECRET).expect("fixture secret"))
}

/// State backed by an in-memory provider and a fixture secret.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, Arc<crate::provider::memory::InMemoryProvider>) {
    use std::time::Duration;

    use crate::auth::{EmailDomainPolicy, SigningSecret, TokenIssuer};
    use crate::provider::memory::InMemoryProvider;

    let secret = SigningSecret::new(TEST_SECRET).expect("fixture secret");
    let provider = Arc::new(InMemoryProvider::new());
    let auth = AuthService::new(
        provider.clone(),
        provider.clone(),
        TokenIssuer::new(&secret),
        EmailDomainPolicy::allow_all(),
        Duration::from_secs(5),
    );
    (AppState::new(auth, TokenVerifier::new(&secret)), provider)
}
