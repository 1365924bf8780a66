// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens issued and verified by this gateway.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to `/auth/login`
//! 2. Gateway checks them with the identity provider and loads the profile
//! 3. Gateway signs an HS256 token with the shared secret (TTL 24h)
//! 4. Client sends `Authorization: Bearer <token>` on protected routes
//! 5. Gateway verifies signature and expiry locally, no provider round trip
//!
//! ## Security
//!
//! - The signing secret is loaded once at startup; absence aborts startup
//! - No clock skew leeway: a token is invalid the second after it expires
//! - Tokens are never stored or revoked server-side

pub mod claims;
pub mod error;
pub mod extractor;
pub mod policy;
pub mod token;

pub use claims::Claims;
pub use error::AuthError;
pub use extractor::Auth;
pub use policy::{resolve_role, EmailDomainPolicy, DEFAULT_ROLE};
pub use token::{IssuedToken, SigningSecret, TokenIssuer, TokenVerifier, TOKEN_TTL_SECS};
