// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for verified session claims.
//!
//! Use the `Auth` extractor in handlers to require a valid token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims is the verified Claims set
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, Claims};
use crate::state::AppState;

/// Extractor for verified claims.
///
/// Verification is local (shared-secret signature plus expiry); the identity
/// provider is never contacted. On success the claims are also stored in the
/// request extensions for anything running later in the same request.
#[derive(Debug)]
pub struct Auth(pub Claims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(Auth(claims));
        }

        // A header with non-visible-ASCII bytes cannot carry a bearer token.
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?),
            None => None,
        };

        let claims = state.verifier.verify_bearer(header).inspect_err(|e| {
            tracing::debug!(error_code = e.error_code(), "rejected bearer token");
        })?;

        parts.extensions.insert(claims.clone());
        Ok(Auth(claims))
    }
}
