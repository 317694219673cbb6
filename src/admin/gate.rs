//! Admin gate: turns the caller's identity into an [`AccessDecision`].
//!
//! The decision is pure and recomputed at every protected boundary (admin
//! layout, nested admin sections, the sign-in reverse-check and every
//! mutation action). Performing the redirect is left to the HTTP layer.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::allowlist::Allowlist;
use crate::identity::{Identity, IdentityProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "destination", rename_all = "snake_case")]
pub enum AccessDecision {
    Allow,
    RedirectToSignIn,
    RedirectToDenied(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    /// Where the caller should be sent, or `None` for [`AccessDecision::Allow`].
    pub fn redirect_target<'a>(&'a self, policy: &'a GatePolicy) -> Option<&'a str> {
        match self {
            AccessDecision::Allow => None,
            AccessDecision::RedirectToSignIn => Some(policy.sign_in_path.as_str()),
            AccessDecision::RedirectToDenied(dest) => Some(dest.as_str()),
        }
    }

    /// 303 response for the redirect variants.
    pub fn into_redirect(self, policy: &GatePolicy) -> Option<Response> {
        self.redirect_target(policy).map(|to| Redirect::to(to).into_response())
    }
}

/// Protected boundary that triggered a check. Each maps to its own denial destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    AdminLayout,
    AdminSection,
    SignIn,
    Action,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::AdminLayout => "admin_layout",
            Surface::AdminSection => "admin_section",
            Surface::SignIn => "sign_in",
            Surface::Action => "action",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    pub sign_in_path: String,
    pub home_path: String,
    pub denied_path: String,
    /// Where an allowed admin is sent from the sign-in page.
    pub admin_home_path: String,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            sign_in_path: "/sign-in".to_string(),
            home_path: "/".to_string(),
            denied_path: "/access-denied".to_string(),
            admin_home_path: "/admin".to_string(),
        }
    }
}

impl GatePolicy {
    /// Signed-in non-admins on the sign-in page go home; everywhere else they
    /// land on the access-denied page.
    pub fn denied_destination(&self, surface: Surface) -> &str {
        match surface {
            Surface::SignIn => &self.home_path,
            Surface::AdminLayout | Surface::AdminSection | Surface::Action => &self.denied_path,
        }
    }
}

/// Outcome of [`AdminGate::check`]: the decision plus whatever identity the provider returned.
#[derive(Debug, Clone)]
pub struct Gated {
    pub decision: AccessDecision,
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    allowlist: Arc<Allowlist>,
    policy: GatePolicy,
}

impl AdminGate {
    pub fn new(allowlist: Arc<Allowlist>, policy: GatePolicy) -> Self {
        Self { allowlist, policy }
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    pub fn decide(&self, identity: Option<&Identity>, denied_destination: &str) -> AccessDecision {
        let Some(email) = identity.and_then(|i| i.email()) else {
            return AccessDecision::RedirectToSignIn;
        };
        if self.allowlist.is_allowed_admin_email(Some(email)) {
            AccessDecision::Allow
        } else {
            AccessDecision::RedirectToDenied(denied_destination.to_string())
        }
    }

    pub fn decide_for(&self, identity: Option<&Identity>, surface: Surface) -> AccessDecision {
        self.decide(identity, self.policy.denied_destination(surface))
    }

    /// Resolve the identity through `provider` and decide. Provider errors are
    /// returned as-is.
    pub async fn check(
        &self,
        provider: &dyn IdentityProvider,
        headers: &HeaderMap,
        surface: Surface,
    ) -> anyhow::Result<Gated> {
        let identity = provider.current_identity(headers).await?;
        let decision = self.decide_for(identity.as_ref(), surface);
        debug!(target: "gate", surface = surface.as_str(), decision = ?decision, "admin gate evaluated");
        Ok(Gated { decision, identity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn gate() -> AdminGate {
        let al = Allowlist::parse("admin@example.com, ops@example.com").unwrap();
        AdminGate::new(Arc::new(al), GatePolicy::default())
    }

    struct Fixed(Option<Identity>);

    #[async_trait]
    impl IdentityProvider for Fixed {
        async fn current_identity(&self, _headers: &HeaderMap) -> anyhow::Result<Option<Identity>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl IdentityProvider for Broken {
        async fn current_identity(&self, _headers: &HeaderMap) -> anyhow::Result<Option<Identity>> {
            Err(anyhow::anyhow!("auth backend unreachable"))
        }
    }

    #[test]
    fn no_identity_goes_to_sign_in() {
        assert_eq!(gate().decide(None, "/access-denied"), AccessDecision::RedirectToSignIn);
    }

    #[test]
    fn identity_without_email_goes_to_sign_in() {
        let id = Identity::new(Some("u-1".into()), None);
        assert_eq!(gate().decide(Some(&id), "/access-denied"), AccessDecision::RedirectToSignIn);
        let blank = Identity::new(Some("u-1".into()), Some("  ".into()));
        assert_eq!(gate().decide(Some(&blank), "/access-denied"), AccessDecision::RedirectToSignIn);
    }

    #[test]
    fn non_admin_is_denied_to_the_call_site_destination() {
        let id = Identity::with_email("eve@example.com");
        let g = gate();
        assert_eq!(g.decide(Some(&id), "/"), AccessDecision::RedirectToDenied("/".into()));
        assert_eq!(
            g.decide_for(Some(&id), Surface::AdminLayout),
            AccessDecision::RedirectToDenied("/access-denied".into())
        );
        assert_eq!(g.decide_for(Some(&id), Surface::SignIn), AccessDecision::RedirectToDenied("/".into()));
    }

    #[test]
    fn admin_is_allowed_on_every_surface() {
        let id = Identity::with_email("ADMIN@example.com");
        let g = gate();
        for s in [Surface::AdminLayout, Surface::AdminSection, Surface::SignIn, Surface::Action] {
            assert_eq!(g.decide_for(Some(&id), s), AccessDecision::Allow);
        }
    }

    #[test]
    fn redirect_targets_follow_policy() {
        let policy = GatePolicy { sign_in_path: "/login".into(), ..GatePolicy::default() };
        assert_eq!(AccessDecision::Allow.redirect_target(&policy), None);
        assert_eq!(AccessDecision::RedirectToSignIn.redirect_target(&policy), Some("/login"));
        assert_eq!(AccessDecision::RedirectToDenied("/".into()).redirect_target(&policy), Some("/"));
        assert!(AccessDecision::Allow.into_redirect(&policy).is_none());
        let resp = AccessDecision::RedirectToSignIn.into_redirect(&policy).unwrap();
        assert_eq!(resp.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get("location").unwrap(), "/login");
    }

    #[tokio::test]
    async fn check_is_idempotent_for_the_same_identity() {
        let g = gate();
        let p = Fixed(Some(Identity::with_email("ops@example.com")));
        let first = g.check(&p, &HeaderMap::new(), Surface::AdminLayout).await.unwrap();
        let second = g.check(&p, &HeaderMap::new(), Surface::Action).await.unwrap();
        assert_eq!(first.decision, AccessDecision::Allow);
        assert_eq!(second.decision, AccessDecision::Allow);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let err = gate().check(&Broken, &HeaderMap::new(), Surface::AdminLayout).await.unwrap_err();
        assert_eq!(err.to_string(), "auth backend unreachable");
    }
}
