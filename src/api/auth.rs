// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/auth` endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse,
        VerifyResponse,
    },
    state::AppState,
};

/// Unwrap a JSON body, answering 400 in the usual error shape when it is unreadable.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()).with_code("invalid_body"))
}

/// Exchange email and password for a session token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Credentials rejected by the identity provider"),
        (status = 500, description = "Profile lookup or provider failure"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = json_body(payload)?;
    let session = state.auth.login(&request).await?;

    Ok(Json(LoginResponse {
        message: "Inicio de sesión exitoso".to_string(),
        session,
    }))
}

/// Create an account with the identity provider.
#[utoipa::path(
    post,
    path = "/auth/registrar",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing fields or rejected by the provider"),
        (status = 403, description = "Email domain not allowed"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Provider failure"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let request = json_body(payload)?;
    let user = state.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuario creado".to_string(),
            user,
        }),
    ))
}

/// Check a bearer token and return its claims.
#[utoipa::path(
    get,
    path = "/auth/verify",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing or malformed Authorization header"),
        (status = 403, description = "Invalid or expired token"),
    )
)]
pub async fn verify(Auth(claims): Auth) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valido: true,
        usuario: claims,
    })
}

/// Profile of the token holder.
#[utoipa::path(
    get,
    path = "/auth/perfil",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Missing or malformed Authorization header"),
        (status = 403, description = "Invalid or expired token"),
        (status = 500, description = "Profile lookup failure"),
    )
)]
pub async fn profile(
    Auth(claims): Auth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let usuario = state.auth.current_profile(&claims).await?;
    Ok(Json(ProfileResponse { usuario }))
}
