// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AutenVerifi - Authentication Gateway
//!
//! Fronts a managed identity backend (Supabase). Credentials and account
//! creation are delegated to the backend; session tokens are minted here and
//! verified locally on protected routes.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session claims, token issuing and verification, request extractor
//! - `credentials` - Email/password validation against the identity provider
//! - `profile` - Profile lookup and provisioning
//! - `provider` - Identity provider and profile store seams, Supabase client
//! - `service` - Login and registration flows

pub mod api;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod models;
pub mod profile;
pub mod provider;
pub mod service;
pub mod state;
