// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supabase (GoTrue + PostgREST) client.
//!
//! Every request authenticates with the service-role key. The reqwest client
//! carries the configured timeout; transport failures, timeouts and 5xx
//! answers all surface as [`ProviderError::Unavailable`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{Identity, IdentityProvider, NewAccount, ProfileRow, ProfileStore, ProviderError};
use crate::config::ProviderSettings;

const PROFILE_COLUMNS: &str = "id,correo,nombre_completo,rol";

pub struct SupabaseClient {
    base_url: String,
    service_key: SecretString,
    profile_table: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    user: GoTrueUser,
}

/// Union of the error shapes GoTrue and PostgREST emit.
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    code: Option<Value>,
}

impl SupabaseClient {
    pub fn new(
        base_url: &Url,
        service_key: SecretString,
        profile_table: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            service_key,
            profile_table: profile_table.into(),
            http,
        })
    }

    pub fn from_settings(settings: ProviderSettings) -> Result<Self, ProviderError> {
        Self::new(
            &settings.base_url,
            settings.service_role_key,
            settings.profile_table,
            settings.timeout,
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    /// Send the request and turn any non-2xx answer into a [`ProviderError`].
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(describe_transport_error(&e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let request = self
            .http
            .post(self.endpoint("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let session: GoTrueSession = self
            .execute(request)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("invalid session payload: {e}")))?;

        Ok(identity_from(session.user, email))
    }

    async fn create_user(&self, account: &NewAccount) -> Result<Identity, ProviderError> {
        let request = self
            .http
            .post(self.endpoint("auth/v1/admin/users"))
            .json(&json!({
                "email": account.email,
                "password": account.password,
                "user_metadata": account.user_metadata,
                "app_metadata": account.app_metadata,
            }));

        let user: GoTrueUser = self
            .execute(request)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("invalid user payload: {e}")))?;

        Ok(identity_from(user, &account.email))
    }

    async fn delete_user(&self, identity_id: &str) -> Result<(), ProviderError> {
        let request = self
            .http
            .delete(self.endpoint(&format!("auth/v1/admin/users/{identity_id}")));

        self.execute(request).await.map(|_| ())
    }

    async fn health(&self) -> Result<(), ProviderError> {
        self.execute(self.http.get(self.endpoint("auth/v1/health")))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn find_profiles(&self, identity_id: &str) -> Result<Vec<ProfileRow>, ProviderError> {
        let request = self
            .http
            .get(self.endpoint(&format!("rest/v1/{}", self.profile_table)))
            .query(&[
                ("id", format!("eq.{identity_id}")),
                ("select", PROFILE_COLUMNS.to_string()),
            ]);

        self.execute(request)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("invalid profile rows: {e}")))
    }

    async fn upsert_profile(&self, row: &ProfileRow) -> Result<(), ProviderError> {
        let request = self
            .http
            .post(self.endpoint(&format!("rest/v1/{}", self.profile_table)))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);

        self.execute(request).await.map(|_| ())
    }
}

fn identity_from(user: GoTrueUser, fallback_email: &str) -> Identity {
    Identity {
        id: user.id,
        email: user
            .email
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| fallback_email.to_string()),
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    }
}

fn error_from_response(status: StatusCode, body: &str) -> ProviderError {
    let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
    let message = provider_message(&payload)
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

    if status.is_server_error() {
        return ProviderError::Unavailable(format!("HTTP {status}: {message}"));
    }

    // Every call carries the service-role key, so 401/403 means the gateway
    // itself was refused, not the end user.
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return ProviderError::Unavailable(format!("service credentials refused, HTTP {status}: {message}"));
    }

    let code = payload.error_code.clone().or_else(|| match &payload.code {
        Some(Value::String(code)) => Some(code.clone()),
        _ => None,
    });

    ProviderError::Rejected {
        status: status.as_u16(),
        code,
        message,
    }
}

/// Human-readable message, in the order GoTrue and PostgREST prefer.
fn provider_message(payload: &ErrorPayload) -> Option<String> {
    let error_text = match &payload.error {
        Some(Value::String(text)) => Some(text.clone()),
        _ => None,
    };
    [
        payload.msg.clone(),
        payload.error_description.clone(),
        payload.message.clone(),
        error_text,
    ]
    .into_iter()
    .flatten()
    .find(|m| !m.trim().is_empty())
}
