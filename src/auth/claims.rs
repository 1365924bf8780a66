// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::policy::DEFAULT_ROLE;

/// Claims carried by a session token.
///
/// Built fresh on every successful login and never persisted. The wire
/// names (`id`, `correo`, `nombre`, `rol`) are what existing clients decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Identity id assigned by the identity provider
    #[serde(rename = "id")]
    pub identity_id: String,

    /// Normalized email address
    #[serde(rename = "correo")]
    pub email: String,

    /// Display name from the profile, if any
    #[serde(rename = "nombre")]
    pub display_name: Option<String>,

    /// Application role
    #[serde(rename = "rol", default = "default_role")]
    pub role: String,

    /// Issued at (seconds since epoch)
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiry (seconds since epoch)
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}
