// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the `/auth` routes. Field names follow
//! the wire format existing clients already speak, so several are Spanish.
//! Request fields are optional at the serde level: absence is reported as
//! a `MissingField` error rather than a deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::auth::Claims;
use crate::profile::Profile;
use crate::provider::Identity;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default, alias = "correo")]
    pub email: Option<String>,
    #[serde(default, alias = "contraseña")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default, alias = "correo")]
    pub email: Option<String>,
    #[serde(default, alias = "contraseña")]
    pub password: Option<String>,
    /// Forwarded to the identity provider as user metadata
    #[serde(default)]
    #[schema(value_type = Object)]
    pub user_metadata: Map<String, Value>,
    /// Forwarded to the identity provider as app metadata
    #[serde(default)]
    #[schema(value_type = Object)]
    pub app_metadata: Map<String, Value>,
}

// =============================================================================
// Responses
// =============================================================================

/// Session handed to the client after a successful login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Session {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    /// Expiry as seconds since epoch
    pub expires_at: i64,
    pub user: Profile,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub session: Session,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub valido: bool,
    pub usuario: Claims,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub usuario: Profile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_accepts_spanish_aliases() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"correo":"a@b.co","contraseña":"pw"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.co"));
        assert_eq!(req.password.as_deref(), Some("pw"));
    }

    #[test]
    fn absent_fields_deserialize_as_none() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(req.password, None);
        assert!(req.user_metadata.is_empty());
    }
}
