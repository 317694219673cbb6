//!
//! folio HTTP server
//! -----------------
//! Axum router for the public portfolio API and the admin surface.
//!
//! Responsibilities:
//! - Public read-only routes for the home page, articles and certifications.
//! - The sign-in reverse-check and the neutral access-denied page.
//! - Admin layouts, sections and mutation actions. Each of them runs the admin
//!   gate on its own; none relies on another route having checked first.
//!
//! Identity comes from an [`IdentityProvider`]; the server never issues
//! sessions itself.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::{error, info};

use crate::admin::{AdminGate, Allowlist, Surface};
use crate::bucket::BucketConfig;
use crate::config::ServerConfig;
use crate::content::ContentStore;
use crate::error::AppError;
use crate::identity::{ForwardedHeaderProvider, IdentityProvider, RequestContext};

pub mod admin;
pub mod pages;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentStore>,
    pub gate: Arc<AdminGate>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Absent when R2 is not configured; upload actions then fail with a config error.
    pub bucket: Option<Arc<BucketConfig>>,
}

impl AppState {
    pub fn new(content: ContentStore, gate: AdminGate, identity: Arc<dyn IdentityProvider>, bucket: Option<BucketConfig>) -> Self {
        Self { content: Arc::new(content), gate: Arc::new(gate), identity, bucket: bucket.map(Arc::new) }
    }
}

/// Why a protected handler did not run: the gate redirected, or something failed.
pub enum Rejection {
    Redirect(Response),
    Error(AppError),
}

impl From<AppError> for Rejection {
    fn from(e: AppError) -> Self {
        Rejection::Error(e)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::Redirect(r) => r,
            Rejection::Error(e) => e.into_response(),
        }
    }
}

fn identity_failure(err: anyhow::Error) -> AppError {
    error!(target: "gate", "identity provider failed: {:#}", err);
    AppError::identity("identity_unavailable", format!("{:#}", err).as_str())
}

/// Run the admin gate for `surface`. On `Allow` returns the request context,
/// otherwise the redirect to send back.
pub async fn require_admin(state: &AppState, headers: &HeaderMap, surface: Surface) -> Result<RequestContext, Rejection> {
    let gated = state
        .gate
        .check(state.identity.as_ref(), headers, surface)
        .await
        .map_err(identity_failure)?;
    match gated.decision.into_redirect(state.gate.policy()) {
        Some(redirect) => Err(Rejection::Redirect(redirect)),
        None => Ok(RequestContext::from_headers(headers, gated.identity)),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/articles", get(pages::articles))
        .route("/articles/{slug}", get(pages::article))
        .route("/certifications", get(pages::certifications))
        .route("/sign-in", get(pages::sign_in))
        .route("/access-denied", get(pages::access_denied))
        .route("/healthz", get(|| async { "folio ok" }))
        .route("/admin", get(admin::dashboard))
        .route("/admin/pages/{slug}", get(admin::page))
        .route("/admin/articles", get(admin::articles))
        .route("/admin/allowlist", get(admin::allowlist))
        .route("/admin/actions/pages/{slug}", post(admin::update_page))
        .route("/admin/actions/articles", post(admin::save_article))
        .route("/admin/actions/articles/{slug}", axum::routing::delete(admin::delete_article))
        .route("/admin/actions/certifications", post(admin::save_certification))
        .route("/admin/actions/certifications/{slug}", axum::routing::delete(admin::delete_certification))
        .route("/admin/actions/uploads", post(admin::prepare_upload))
        .with_state(state)
}

/// Start the HTTP server. The allowlist must already be built; an empty one
/// never reaches this point.
pub async fn run(cfg: ServerConfig, allowlist: Arc<Allowlist>) -> anyhow::Result<()> {
    let content = ContentStore::open(&cfg.content_path)
        .with_context(|| format!("While loading site content from {}", cfg.content_path))?;
    let bucket = BucketConfig::from_env();
    match &bucket {
        Some(b) => info!(target: "startup", "object storage bucket={} public_base={}", b.bucket, b.public_base_url),
        None => info!(target: "startup", "object storage not configured; upload actions disabled"),
    }
    let provider = ForwardedHeaderProvider::new(cfg.identity_email_header.clone(), cfg.identity_user_header.clone());
    info!(
        target: "startup",
        "identity from headers email={} user={}; {} admin(s) allowlisted",
        provider.email_header, provider.user_header, allowlist.len()
    );
    let gate = AdminGate::new(allowlist, cfg.gate.clone());
    let state = AppState::new(content, gate, Arc::new(provider), bucket);
    let app = router(state);

    let addr = SocketAddr::new(cfg.bind, cfg.http_port);
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
