//! Admin layouts, sections and mutation actions.
//!
//! Every handler calls [`require_admin`] before touching state, including the
//! actions, so invoking an action URL directly is checked the same way as
//! navigating to it from the dashboard. Request bodies are decoded only after
//! the gate has allowed the caller.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{require_admin, AppState, Rejection};
use crate::admin::Surface;
use crate::bucket::{is_allowed_image_type, object_key};
use crate::content::{Article, Certification, PageUpdate};
use crate::error::AppError;

/// Body extraction result, inspected only after `require_admin` passes.
type Body<T> = Result<Json<T>, JsonRejection>;

fn decode<T>(body: Body<T>) -> Result<T, AppError> {
    body.map(|Json(v)| v)
        .map_err(|e| AppError::user("invalid_body", e.body_text().as_str()))
}

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, Rejection> {
    let ctx = require_admin(&state, &headers, Surface::AdminLayout).await?;
    let pages: Vec<String> = state.content.pages().into_iter().map(|p| p.slug).collect();
    Ok(Json(json!({
        "status": "ok",
        "admin": ctx.editor(),
        "pages": pages,
        "articles": state.content.articles().len(),
        "certifications": state.content.certifications().len(),
        "uploads_enabled": state.bucket.is_some(),
    })))
}

pub async fn page(State(state): State<AppState>, headers: HeaderMap, Path(slug): Path<String>) -> Result<Json<Value>, Rejection> {
    require_admin(&state, &headers, Surface::AdminSection).await?;
    let page = state.content.page(&slug)?;
    Ok(Json(json!({"status": "ok", "page": page})))
}

/// All articles, drafts included.
pub async fn articles(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, Rejection> {
    require_admin(&state, &headers, Surface::AdminSection).await?;
    Ok(Json(json!({"status": "ok", "articles": state.content.articles()})))
}

pub async fn allowlist(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, Rejection> {
    require_admin(&state, &headers, Surface::AdminSection).await?;
    Ok(Json(json!({"status": "ok", "admins": state.gate.allowlist().entries()})))
}

pub async fn update_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    body: Body<PageUpdate>,
) -> Result<Json<Value>, Rejection> {
    let ctx = require_admin(&state, &headers, Surface::Action).await?;
    let update = decode(body)?;
    let editor = ctx.editor();
    let page = state.content.update_page(&slug, update, &editor)?;
    info!(target: "admin", request_id = ctx.request_id(), editor = %editor, "page updated slug={}", slug);
    Ok(Json(json!({"status": "ok", "page": page})))
}

pub async fn save_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body<Article>,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    let ctx = require_admin(&state, &headers, Surface::Action).await?;
    let article = decode(body)?;
    let editor = ctx.editor();
    let (saved, created) = state.content.upsert_article(article, &editor)?;
    info!(target: "admin", request_id = ctx.request_id(), editor = %editor, created, "article saved slug={}", saved.slug);
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(json!({"status": "ok", "article": saved}))))
}

pub async fn delete_article(State(state): State<AppState>, headers: HeaderMap, Path(slug): Path<String>) -> Result<Json<Value>, Rejection> {
    let ctx = require_admin(&state, &headers, Surface::Action).await?;
    state.content.delete_article(&slug)?;
    info!(target: "admin", request_id = ctx.request_id(), editor = %ctx.editor(), "article deleted slug={}", slug);
    Ok(Json(json!({"status": "ok", "deleted": slug})))
}

pub async fn save_certification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body<Certification>,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    let ctx = require_admin(&state, &headers, Surface::Action).await?;
    let cert = decode(body)?;
    let editor = ctx.editor();
    let (saved, created) = state.content.upsert_certification(cert, &editor)?;
    info!(target: "admin", request_id = ctx.request_id(), editor = %editor, created, "certification saved slug={}", saved.slug);
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(json!({"status": "ok", "certification": saved}))))
}

pub async fn delete_certification(State(state): State<AppState>, headers: HeaderMap, Path(slug): Path<String>) -> Result<Json<Value>, Rejection> {
    let ctx = require_admin(&state, &headers, Surface::Action).await?;
    state.content.delete_certification(&slug)?;
    info!(target: "admin", request_id = ctx.request_id(), editor = %ctx.editor(), "certification deleted slug={}", slug);
    Ok(Json(json!({"status": "ok", "deleted": slug})))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub folder: Option<String>,
}

/// Reserve an object key and report the public URL it will be served from.
pub async fn prepare_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body<UploadRequest>,
) -> Result<Json<Value>, Rejection> {
    let ctx = require_admin(&state, &headers, Surface::Action).await?;
    let req = decode(body)?;
    let Some(bucket) = state.bucket.as_ref() else {
        return Err(AppError::config("storage_not_configured", "object storage is not configured").into());
    };
    if !is_allowed_image_type(&req.content_type) {
        return Err(AppError::user("unsupported_content_type", format!("'{}' is not an accepted image type", req.content_type).as_str()).into());
    }
    let key = object_key(req.folder.as_deref().unwrap_or("uploads"), &req.file_name)?;
    let public_url = bucket.public_url(&key);
    info!(target: "admin", request_id = ctx.request_id(), editor = %ctx.editor(), "upload key reserved key={}", key);
    Ok(Json(json!({
        "status": "ok",
        "bucket": bucket.bucket,
        "key": key,
        "public_url": public_url,
        "endpoint": bucket.endpoint(),
    })))
}
