// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role defaulting and registration domain policy.

/// Role assigned when a profile has none.
pub const DEFAULT_ROLE: &str = "usuario";

/// Resolve the role stored on a profile row.
///
/// Absent, null or blank roles fall back to [`DEFAULT_ROLE`].
pub fn resolve_role(stored: Option<&str>) -> String {
    stored
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROLE)
        .to_string()
}

/// Email domains allowed to register.
///
/// An empty allow-list permits every address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailDomainPolicy {
    allowed: Vec<String>,
}

impl EmailDomainPolicy {
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Entries are trimmed, lowercased and stripped of a leading `@`.
    pub fn from_list<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_start_matches('@').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed.is_empty()
    }

    pub fn permits(&self, email: &str) -> bool {
        if !self.is_restricted() {
            return true;
        }
        match email_domain(email) {
            Some(domain) => self.allowed.iter().any(|d| *d == domain),
            None => false,
        }
    }
}

/// Lowercased domain after the last `@`.
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_ascii_lowercase())
    }
}
