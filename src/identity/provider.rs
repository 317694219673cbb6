use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::http::HeaderMap;

use super::principal::Identity;

pub const DEFAULT_EMAIL_HEADER: &str = "x-forwarded-email";
pub const DEFAULT_USER_HEADER: &str = "x-forwarded-user";

/// Source of the authenticated identity for a request.
///
/// `Ok(None)` means "nobody is signed in". `Err` means the provider could not
/// tell, and callers must surface it rather than treat it as anonymous.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self, headers: &HeaderMap) -> Result<Option<Identity>>;
}

/// Trusts identity headers set by an authenticating reverse proxy
/// (oauth2-proxy and similar). Must only be deployed behind such a proxy.
#[derive(Debug, Clone)]
pub struct ForwardedHeaderProvider {
    pub email_header: String,
    pub user_header: String,
}

impl Default for ForwardedHeaderProvider {
    fn default() -> Self {
        Self { email_header: DEFAULT_EMAIL_HEADER.to_string(), user_header: DEFAULT_USER_HEADER.to_string() }
    }
}

impl ForwardedHeaderProvider {
    pub fn new<S: Into<String>>(email_header: S, user_header: S) -> Self {
        Self { email_header: email_header.into(), user_header: user_header.into() }
    }

    fn header(headers: &HeaderMap, name: &str) -> Result<Option<String>> {
        let Some(v) = headers.get(name) else {
            return Ok(None);
        };
        let s = v
            .to_str()
            .map_err(|_| anyhow!("identity_header_invalid: {} is not visible ASCII", name))?;
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        Ok(Some(s.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for ForwardedHeaderProvider {
    async fn current_identity(&self, headers: &HeaderMap) -> Result<Option<Identity>> {
        let email = Self::header(headers, &self.email_header)?;
        let user_id = Self::header(headers, &self.user_header)?;
        if email.is_none() && user_id.is_none() {
            return Ok(None);
        }
        Ok(Some(Identity::new(user_id, email)))
    }
}
