//! Administrator email allowlist.
//!
//! The allowlist is read once from configuration, normalised (trimmed and
//! lower-cased) and then held read-only for the rest of the process. Every
//! admin-gated surface consults it through [`Allowlist::is_allowed_admin_email`].

use std::collections::BTreeSet;
use std::sync::{Arc, Once};

use once_cell::sync::OnceCell;
use tracing::warn;

/// Server-only variable holding the comma-separated admin emails.
pub const PRIMARY_VAR: &str = "ADMIN_EMAIL_ALLOWLIST";
/// Deprecated variable that used to be exposed to client bundles.
pub const FALLBACK_VAR: &str = "NEXT_PUBLIC_ADMIN_EMAILS";
/// Deployment environment name; see [`is_production_like`].
pub const ENV_VAR: &str = "FOLIO_ENV";

static FALLBACK_WARNING: Once = Once::new();
static SHARED: OnceCell<Arc<Allowlist>> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllowlistError {
    #[error("no authorized administrator configured (set ADMIN_EMAIL_ALLOWLIST)")]
    Empty,
}

/// Returns true for environment names that should stay quiet about the fallback variable.
pub fn is_production_like(env_name: Option<&str>) -> bool {
    match env_name.map(|s| s.trim().to_ascii_lowercase()) {
        Some(s) => matches!(s.as_str(), "production" | "prod" | "staging"),
        None => false,
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Pick the raw allowlist string: primary variable first, then the deprecated
/// fallback, then empty. `lookup` maps a variable name to its value.
pub fn resolve_configuration_source<F>(lookup: F, production_like: bool) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(primary) = non_blank(lookup(PRIMARY_VAR)) {
        return primary;
    }
    if let Some(fallback) = non_blank(lookup(FALLBACK_VAR)) {
        if !production_like {
            FALLBACK_WARNING.call_once(|| {
                warn!(
                    target: "admin",
                    "{} is deprecated and may leak into client bundles; move the list to {}",
                    FALLBACK_VAR, PRIMARY_VAR
                );
            });
        }
        return fallback;
    }
    String::new()
}

/// Reads [`ENV_VAR`] from the process environment.
pub fn env_is_production_like() -> bool {
    is_production_like(std::env::var(ENV_VAR).ok().as_deref())
}

pub fn resolve_configuration_source_from_env(production_like: bool) -> String {
    resolve_configuration_source(|k| std::env::var(k).ok(), production_like)
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Set of normalised administrator emails. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    entries: BTreeSet<String>,
}

impl Allowlist {
    /// Split on commas, normalise, drop blanks. Fails when nothing is left.
    pub fn parse(raw: &str) -> Result<Self, AllowlistError> {
        let entries: BTreeSet<String> = raw
            .split(',')
            .map(normalize)
            .filter(|e| !e.is_empty())
            .collect();
        if entries.is_empty() {
            return Err(AllowlistError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn from_env(production_like: bool) -> Result<Self, AllowlistError> {
        Self::parse(&resolve_configuration_source_from_env(production_like))
    }

    pub fn is_allowed_admin_email(&self, email: Option<&str>) -> bool {
        let Some(email) = email else {
            return false;
        };
        let e = normalize(email);
        if e.is_empty() {
            return false;
        }
        self.entries.contains(&e)
    }

    /// Snapshot of the entries in lexicographic order. For display only.
    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the process-wide allowlist with the caller's environment
/// classification. Once built, later calls return the same instance and the
/// flag is ignored. A failed build is not cached.
pub fn init_shared(production_like: bool) -> Result<Arc<Allowlist>, AllowlistError> {
    SHARED.get_or_try_init(|| Allowlist::from_env(production_like).map(Arc::new)).cloned()
}

/// Process-wide allowlist, built on first access from the environment,
/// classified by [`ENV_VAR`].
pub fn shared() -> Result<Arc<Allowlist>, AllowlistError> {
    init_shared(env_is_production_like())
}

pub fn is_allowed_admin_email(email: Option<&str>) -> Result<bool, AllowlistError> {
    Ok(shared()?.is_allowed_admin_email(email))
}

pub fn admin_email_allowlist() -> Result<Vec<String>, AllowlistError> {
    Ok(shared()?.entries())
}

#[cfg(test)]
#[path = "allowlist_tests.rs"]
mod allowlist_tests;
