// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`GatewayConfig`] loaded
//! once at startup. Any missing or invalid required value aborts startup;
//! nothing here is re-read per request.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SUPABASE_JWT_SECRET` | Shared secret used to sign session tokens | Required |
//! | `SUPABASE_URL` | Base URL of the managed backend | Required |
//! | `SUPABASE_ROLE_KEY` | Service-role key for the managed backend | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `4000` |
//! | `PROFILE_TABLE` | Table holding user profiles | `usuarios` |
//! | `PROVIDER_TIMEOUT_SECS` | Timeout for every backend call | `10` |
//! | `ALLOWED_EMAIL_DOMAINS` | Comma-separated registration allow-list | any domain |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::auth::{EmailDomainPolicy, SigningSecret};

pub const JWT_SECRET_ENV: &str = "SUPABASE_JWT_SECRET";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ROLE_KEY_ENV: &str = "SUPABASE_ROLE_KEY";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const PROFILE_TABLE_ENV: &str = "PROFILE_TABLE";
pub const PROVIDER_TIMEOUT_ENV: &str = "PROVIDER_TIMEOUT_SECS";
pub const ALLOWED_EMAIL_DOMAINS_ENV: &str = "ALLOWED_EMAIL_DOMAINS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_PROFILE_TABLE: &str = "usuarios";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Unknown values fall back to `Pretty`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// Connection settings for the managed backend.
#[derive(Debug)]
pub struct ProviderSettings {
    pub base_url: Url,
    pub service_role_key: SecretString,
    pub profile_table: String,
    pub timeout: Duration,
}

/// Everything the gateway needs at startup.
#[derive(Debug)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub signing_secret: SigningSecret,
    pub provider: ProviderSettings,
    pub email_domains: EmailDomainPolicy,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let signing_secret = SigningSecret::new(required(JWT_SECRET_ENV)?)?;

        let raw_url = required(SUPABASE_URL_ENV)?;
        let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            name: SUPABASE_URL_ENV,
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: SUPABASE_URL_ENV,
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            });
        }

        let service_role_key = SecretString::from(required(SUPABASE_ROLE_KEY_ENV)?);

        let port = match optional(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match optional(PROVIDER_TIMEOUT_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        name: PROVIDER_TIMEOUT_ENV,
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: PROVIDER_TIMEOUT_ENV,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        let email_domains = optional(ALLOWED_EMAIL_DOMAINS_ENV)
            .map(|raw| EmailDomainPolicy::from_list(raw.split(',')))
            .unwrap_or_default();

        Ok(Self {
            host: optional(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            signing_secret,
            provider: ProviderSettings {
                base_url,
                service_role_key,
                profile_table: optional(PROFILE_TABLE_ENV)
                    .unwrap_or_else(|| DEFAULT_PROFILE_TABLE.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            email_domains,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
