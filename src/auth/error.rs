// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Authentication error type.
///
/// Header problems are the "token missing" case and answer 401; a token
/// that is present but fails verification answers 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Header present but not of the shape `Bearer <token>`
    InvalidAuthHeader,
    /// Token is not a decodable JWT
    MalformedToken,
    /// Token signature does not match the shared secret
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Signing failed
    InternalError(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::MalformedToken | AuthError::InvalidSignature | AuthError::TokenExpired => {
                StatusCode::FORBIDDEN
            }
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for the "no usable bearer token was presented" outcome.
    pub fn is_token_missing(&self) -> bool {
        matches!(self, AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader)
    }

    /// True for the "token presented but rejected" outcome.
    pub fn is_token_invalid(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken | AuthError::InvalidSignature | AuthError::TokenExpired
        )
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Token requerido"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Token requerido (formato esperado 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token inválido"),
            AuthError::InvalidSignature => write!(f, "Token inválido"),
            AuthError::TokenExpired => write!(f, "Token expirado"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "token signing failed");
            return ApiError::internal().into_response();
        }
        ApiError::new(status, self.to_string())
            .with_code(self.error_code())
            .into_response()
    }
}
