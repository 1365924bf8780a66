// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and registration flows.
//!
//! Login runs Credential Validator → Profile Lookup → Token Issuer.
//! Registration checks its input locally, applies the email domain policy,
//! creates the account with the identity provider and provisions the
//! profile row.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::auth::policy::email_domain;
use crate::auth::{Claims, EmailDomainPolicy, TokenIssuer, DEFAULT_ROLE};
use crate::credentials::{normalize_email, required, required_password, CredentialValidator};
use crate::error::GatewayError;
use crate::models::{LoginRequest, RegisterRequest, Session};
use crate::profile::{Profile, ProfileLookup};
use crate::provider::{with_timeout, Identity, IdentityProvider, NewAccount, ProfileStore, ProviderError};

const TOKEN_TYPE: &str = "bearer";

#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    validator: CredentialValidator,
    profiles: ProfileLookup,
    issuer: TokenIssuer,
    domains: EmailDomainPolicy,
    timeout: Duration,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn ProfileStore>,
        issuer: TokenIssuer,
        domains: EmailDomainPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            validator: CredentialValidator::new(provider.clone(), timeout),
            profiles: ProfileLookup::new(store, timeout),
            provider,
            issuer,
            domains,
            timeout,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Session, GatewayError> {
        let identity = self
            .validator
            .validate(request.email.as_deref(), request.password.as_deref())
            .await?;

        let mut profile = self.profiles.lookup(&identity.id).await?;
        let email = profile
            .email
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| identity.email.clone());
        profile.email = Some(email.clone());

        let issued = self.issuer.issue(
            &identity.id,
            &email,
            profile.display_name.as_deref(),
            &profile.role,
        )?;

        tracing::info!(identity_id = %identity.id, role = %profile.role, "session issued");

        Ok(Session {
            access_token: issued.access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: issued.claims.expires_at - issued.claims.issued_at,
            expires_at: issued.claims.expires_at,
            user: profile,
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Identity, GatewayError> {
        let email = normalize_email(required(request.email.as_deref(), "email")?);
        let password = required_password(request.password.as_deref())?.to_string();

        if !self.domains.permits(&email) {
            tracing::debug!(%email, "registration refused by domain policy");
            return Err(GatewayError::DomainNotAllowed(
                email_domain(&email).unwrap_or_default(),
            ));
        }

        let display_name = display_name_from(&request.user_metadata);
        let account = NewAccount {
            email,
            password,
            user_metadata: request.user_metadata,
            app_metadata: request.app_metadata,
        };

        let identity = with_timeout(self.timeout, self.provider.create_user(&account))
            .await
            .map_err(registration_error)?;

        // Role is never taken from the request; it starts at the default.
        let profile = Profile {
            identity_id: identity.id.clone(),
            display_name,
            role: DEFAULT_ROLE.to_string(),
            email: Some(identity.email.clone()),
        };
        if let Err(e) = self.profiles.provision(&profile).await {
            self.discard_account(&identity.id).await;
            return Err(e);
        }

        tracing::info!(identity_id = %identity.id, "account registered");
        Ok(identity)
    }

    /// Remove an account whose profile row could not be written, so the
    /// email can be registered again.
    async fn discard_account(&self, identity_id: &str) {
        match with_timeout(self.timeout, self.provider.delete_user(identity_id)).await {
            Ok(()) => {
                tracing::warn!(%identity_id, "profile provisioning failed; account removed")
            }
            Err(e) => tracing::error!(
                %identity_id,
                error = %e,
                "profile provisioning failed and the account could not be removed"
            ),
        }
    }

    /// Current profile of the token holder.
    pub async fn current_profile(&self, claims: &Claims) -> Result<Profile, GatewayError> {
        let mut profile = self.profiles.lookup(&claims.identity_id).await?;
        if profile.email.as_deref().map_or(true, str::is_empty) {
            profile.email = Some(claims.email.clone());
        }
        Ok(profile)
    }

    pub async fn provider_healthy(&self) -> bool {
        match with_timeout(self.timeout, self.provider.health()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "identity provider health check failed");
                false
            }
        }
    }
}

fn registration_error(err: ProviderError) -> GatewayError {
    if err.is_duplicate_account() {
        return GatewayError::DuplicateAccount;
    }
    match err {
        ProviderError::Rejected { message, .. } => GatewayError::RegistrationRejected(message),
        other => GatewayError::ProviderUnavailable(other.to_string()),
    }
}

fn display_name_from(metadata: &serde_json::Map<String, Value>) -> Option<String> {
    ["nombre_completo", "nombre"]
        .iter()
        .filter_map(|key| metadata.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::{SigningSecret, TokenVerifier, TOKEN_TTL_SECS};
    use async_trait::async_trait;

    use crate::provider::memory::InMemoryProvider;
    use crate::provider::ProfileRow;

    /// Store that can be read but never written.
    struct ReadOnlyStore;

    #[async_trait]
    impl ProfileStore for ReadOnlyStore {
        async fn find_profiles(&self, _identity_id: &str) -> Result<Vec<ProfileRow>, ProviderError> {
            Ok(Vec::new())
        }

        async fn upsert_profile(&self, _row: &ProfileRow) -> Result<(), ProviderError> {
            Err(ProviderError::Unavailable("db down".to_string()))
        }
    }

    const SECRET: &str = "fixture-secret";

    fn service_over(provider: Arc<InMemoryProvider>, domains: EmailDomainPolicy) -> AuthService {
        let secret = SigningSecret::new(SECRET).unwrap();
        AuthService::new(
            provider.clone(),
            provider,
            TokenIssuer::new(&secret),
            domains,
            Duration::from_secs(5),
        )
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(&SigningSecret::new(SECRET).unwrap())
    }

    async fn seeded() -> Arc<InMemoryProvider> {
        let provider = Arc::new(InMemoryProvider::new());
        provider.insert_account("user-1", "ana@example.com", "secreta").await;
        provider
            .insert_profile(ProfileRow {
                id: "user-1".to_string(),
                correo: Some("ana@example.com".to_string()),
                nombre_completo: Some("Ana Pérez".to_string()),
                rol: None,
            })
            .await;
        provider
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn register_request(email: Option<&str>, password: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn login_issues_token_for_provider_identity() {
        let service = service_over(seeded().await, EmailDomainPolicy::allow_all());
        let session = service
            .login(&login_request("Ana@Example.com ", "secreta"))
            .await
            .unwrap();

        let claims = verifier().verify(&session.access_token).unwrap();
        assert_eq!(claims.identity_id, "user-1");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.display_name.as_deref(), Some("Ana Pérez"));
        assert_eq!(claims.role, "usuario");
        assert_eq!(session.expires_in, TOKEN_TTL_SECS);
        assert_eq!(session.expires_at, claims.expires_at);
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.user.role, "usuario");
    }

    #[tokio::test]
    async fn login_without_profile_fails_closed() {
        let provider = Arc::new(InMemoryProvider::new());
        provider.insert_account("user-2", "luis@example.com", "secreta").await;
        let service = service_over(provider, EmailDomainPolicy::allow_all());

        let err = service
            .login(&login_request("luis@example.com", "secreta"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ProfileUnavailable(_)));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_invalid_credentials() {
        let service = service_over(seeded().await, EmailDomainPolicy::allow_all());
        let err = service
            .login(&login_request("ana@example.com", "otra"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn register_creates_account_and_default_profile() {
        let provider = Arc::new(InMemoryProvider::new());
        let service = service_over(provider.clone(), EmailDomainPolicy::allow_all());

        let mut request = register_request(Some(" Nuevo@Example.com"), Some("secreta"));
        request.user_metadata = json!({"nombre_completo": "Nuevo Usuario"})
            .as_object()
            .cloned()
            .unwrap();
        request.app_metadata = json!({"rol": "admin"}).as_object().cloned().unwrap();

        let identity = service.register(request).await.unwrap();
        assert_eq!(identity.email, "nuevo@example.com");

        let rows = provider.profile_rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, identity.id);
        assert_eq!(rows[0].rol.as_deref(), Some("usuario"));
        assert_eq!(rows[0].nombre_completo.as_deref(), Some("Nuevo Usuario"));

        let session = service
            .login(&login_request("nuevo@example.com", "secreta"))
            .await
            .unwrap();
        assert_eq!(session.user.identity_id, identity.id);
    }

    #[tokio::test]
    async fn failed_profile_write_removes_the_new_account() {
        let provider = Arc::new(InMemoryProvider::new());
        let secret = SigningSecret::new(SECRET).unwrap();
        let broken = AuthService::new(
            provider.clone(),
            Arc::new(ReadOnlyStore),
            TokenIssuer::new(&secret),
            EmailDomainPolicy::allow_all(),
            Duration::from_secs(5),
        );

        let err = broken
            .register(register_request(Some("nuevo@example.com"), Some("secreta")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ProfileUnavailable(_)));

        let err = broken
            .register(register_request(Some("nuevo@example.com"), Some("secreta")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ProfileUnavailable(_)));

        // Once the store recovers the same email registers and logs in.
        let healthy = service_over(provider, EmailDomainPolicy::allow_all());
        healthy
            .register(register_request(Some("nuevo@example.com"), Some("secreta")))
            .await
            .unwrap();
        healthy
            .login(&login_request("nuevo@example.com", "secreta"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_accepts_whitespace_password() {
        let provider = Arc::new(InMemoryProvider::new());
        let service = service_over(provider, EmailDomainPolicy::allow_all());
        service
            .register(register_request(Some("espacio@example.com"), Some("      ")))
            .await
            .unwrap();
        let session = service
            .login(&login_request("espacio@example.com", "      "))
            .await
            .unwrap();
        assert_eq!(session.user.role, "usuario");
    }

    #[tokio::test]
    async fn register_duplicate_is_conflict() {
        let service = service_over(seeded().await, EmailDomainPolicy::allow_all());
        let err = service
            .register(register_request(Some("ANA@example.com"), Some("secreta")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DuplicateAccount));
    }

    #[tokio::test]
    async fn register_missing_password_makes_no_external_call() {
        let provider = Arc::new(InMemoryProvider::new());
        let service = service_over(provider.clone(), EmailDomainPolicy::allow_all());
        let err = service
            .register(register_request(Some("a@example.com"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingField("password")));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn register_outside_allowed_domains_is_refused_locally() {
        let provider = Arc::new(InMemoryProvider::new());
        let service = service_over(provider.clone(), EmailDomainPolicy::from_list(["empresa.com"]));
        let err = service
            .register(register_request(Some("a@gmail.com"), Some("secreta")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DomainNotAllowed(ref d) if d == "gmail.com"));
        assert_eq!(provider.calls(), 0);

        service
            .register(register_request(Some("a@empresa.com"), Some("secreta")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_weak_password_passes_provider_message() {
        let service = service_over(Arc::new(InMemoryProvider::new()), EmailDomainPolicy::allow_all());
        let err = service
            .register(register_request(Some("a@example.com"), Some("123")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::RegistrationRejected(ref m) if m.contains("6 characters")));
    }

    #[tokio::test]
    async fn current_profile_reads_live_row() {
        let service = service_over(seeded().await, EmailDomainPolicy::allow_all());
        let session = service
            .login(&login_request("ana@example.com", "secreta"))
            .await
            .unwrap();
        let claims = verifier().verify(&session.access_token).unwrap();
        let profile = service.current_profile(&claims).await.unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Ana Pérez"));
    }

    #[tokio::test]
    async fn provider_health_reflects_outage() {
        let healthy = service_over(Arc::new(InMemoryProvider::new()), EmailDomainPolicy::allow_all());
        assert!(healthy.provider_healthy().await);

        let down = service_over(Arc::new(InMemoryProvider::unavailable()), EmailDomainPolicy::allow_all());
        assert!(!down.provider_healthy().await);
    }

    #[test]
    fn display_name_prefers_full_name() {
        let metadata = json!({"nombre": "Ana", "nombre_completo": "Ana Pérez"});
        assert_eq!(
            display_name_from(metadata.as_object().unwrap()).as_deref(),
            Some("Ana Pérez")
        );
        let metadata = json!({"nombre": " Ana ", "nombre_completo": ""});
        assert_eq!(display_name_from(metadata.as_object().unwrap()).as_deref(), Some("Ana"));
        assert_eq!(display_name_from(&Default::default()), None);
    }
}
