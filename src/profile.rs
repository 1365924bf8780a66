// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile lookup and provisioning.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::resolve_role;
use crate::error::GatewayError;
use crate::provider::{with_timeout, ProfileRow, ProfileStore};

/// Application attributes of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Profile {
    #[serde(rename = "id")]
    pub identity_id: String,
    #[serde(rename = "nombre_completo")]
    pub display_name: Option<String>,
    #[serde(rename = "rol")]
    pub role: String,
    #[serde(rename = "correo")]
    pub email: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            role: resolve_role(row.rol.as_deref()),
            identity_id: row.id,
            display_name: row.nombre_completo,
            email: row.correo,
        }
    }
}

impl From<&Profile> for ProfileRow {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.identity_id.clone(),
            correo: profile.email.clone(),
            nombre_completo: profile.display_name.clone(),
            rol: Some(profile.role.clone()),
        }
    }
}

#[derive(Clone)]
pub struct ProfileLookup {
    store: Arc<dyn ProfileStore>,
    timeout: Duration,
}

impl ProfileLookup {
    pub fn new(store: Arc<dyn ProfileStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Fetch the single profile row for an identity.
    ///
    /// Zero or several rows fail closed with `ProfileUnavailable`.
    pub async fn lookup(&self, identity_id: &str) -> Result<Profile, GatewayError> {
        let mut rows = with_timeout(self.timeout, self.store.find_profiles(identity_id))
            .await
            .map_err(|e| GatewayError::ProviderUnavailable(e.to_string()))?;

        if rows.len() != 1 {
            tracing::warn!(
                identity_id = %identity_id,
                rows = rows.len(),
                "expected exactly one profile row"
            );
            return Err(GatewayError::ProfileUnavailable(format!(
                "{} profile rows for identity {identity_id}",
                rows.len()
            )));
        }

        Ok(rows.remove(0).into())
    }

    /// Create or refresh the profile row at registration time.
    pub async fn provision(&self, profile: &Profile) -> Result<(), GatewayError> {
        let row = ProfileRow::from(profile);
        with_timeout(self.timeout, self.store.upsert_profile(&row))
            .await
            .map_err(|e| GatewayError::ProfileUnavailable(format!("failed to provision profile: {e}")))
    }
}
