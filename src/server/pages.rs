//! Public routes plus the sign-in reverse-check.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use super::{identity_failure, AppState};
use crate::admin::{AccessDecision, Surface};
use crate::content::Article;
use crate::error::{AppError, AppResult};

const HOME_LATEST_ARTICLES: usize = 3;

fn is_published(a: &Article) -> bool {
    a.published_at.map(|t| t <= Utc::now()).unwrap_or(false)
}

fn published(state: &AppState) -> Vec<Article> {
    state.content.articles().into_iter().filter(is_published).collect()
}

pub async fn home(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let page = state.content.page("home")?;
    let latest: Vec<Article> = published(&state).into_iter().take(HOME_LATEST_ARTICLES).collect();
    Ok(Json(json!({"status": "ok", "page": page, "latest_articles": latest})))
}

pub async fn articles(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let page = state.content.page("articles")?;
    Ok(Json(json!({"status": "ok", "page": page, "articles": published(&state)})))
}

/// Drafts and scheduled articles read as missing.
pub async fn article(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<Value>> {
    let a = state.content.article(&slug)?;
    if !is_published(&a) {
        return Err(AppError::not_found("article_not_found", format!("no article '{}'", slug).as_str()));
    }
    Ok(Json(json!({"status": "ok", "article": a})))
}

pub async fn certifications(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let page = state.content.page("certifications")?;
    Ok(Json(json!({"status": "ok", "page": page, "certifications": state.content.certifications()})))
}

/// Admins skip the form, signed-in non-admins are sent home, everyone else
/// gets the sign-in prompt.
pub async fn sign_in(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let gated = state
        .gate
        .check(state.identity.as_ref(), &headers, Surface::SignIn)
        .await
        .map_err(identity_failure)?;
    let resp = match gated.decision {
        AccessDecision::Allow => Redirect::to(&state.gate.policy().admin_home_path).into_response(),
        AccessDecision::RedirectToDenied(dest) => Redirect::to(&dest).into_response(),
        AccessDecision::RedirectToSignIn => Json(json!({
            "status": "ok",
            "page": "sign_in",
            "message": "Sign in with an administrator account to manage this site."
        }))
        .into_response(),
    };
    Ok(resp)
}

pub async fn access_denied(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "denied",
        "page": "access_denied",
        "message": "This account does not have access to the admin area.",
        "home": state.gate.policy().home_path
    }))
}
