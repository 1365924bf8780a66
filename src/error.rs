// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;

/// Message returned for every server-side failure. Details stay in the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error en el servidor";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            .with_code("internal_error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}

/// Failures of the login, registration and profile operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Required input absent or blank; raised before any external call.
    #[error("{0} requerido")]
    MissingField(&'static str),

    /// Identity provider rejected the credentials; message passed through verbatim.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("El dominio del correo no está permitido: {0}")]
    DomainNotAllowed(String),

    #[error("El correo ya está registrado")]
    DuplicateAccount,

    /// Identity provider refused to create the account for another reason.
    #[error("{0}")]
    RegistrationRejected(String),

    #[error("profile unavailable: {0}")]
    ProfileUnavailable(String),

    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::MissingField(_) => "missing_field",
            GatewayError::InvalidCredentials(_) => "invalid_credentials",
            GatewayError::DomainNotAllowed(_) => "domain_not_allowed",
            GatewayError::DuplicateAccount => "duplicate_account",
            GatewayError::RegistrationRejected(_) => "registration_rejected",
            GatewayError::ProfileUnavailable(_) => "profile_unavailable",
            GatewayError::ProviderUnavailable(_) => "provider_unavailable",
            GatewayError::Auth(e) => e.error_code(),
            GatewayError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingField(_) | GatewayError::RegistrationRejected(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            GatewayError::DomainNotAllowed(_) => StatusCode::FORBIDDEN,
            GatewayError::DuplicateAccount => StatusCode::CONFLICT,
            GatewayError::Auth(e) => e.status_code(),
            GatewayError::ProfileUnavailable(_)
            | GatewayError::ProviderUnavailable(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!(error = %err, error_code = err.error_code(), "request failed");
            return ApiError::new(status, INTERNAL_ERROR_MESSAGE).with_code(err.error_code());
        }
        ApiError::new(status, err.to_string()).with_code(err.error_code())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
