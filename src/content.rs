//!
//! folio content store
//! -------------------
//! Admin-owned site content: editable page copy, articles and certifications.
//! Everything lives in one JSON document held in memory behind a lock and,
//! when a path is configured, written back after every successful mutation.
//!
//! Mutations are applied to a copy and only swapped in once the copy has been
//! persisted, so a failed write never leaves memory ahead of disk.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::collections::BTreeMap;

use anyhow::Context;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub slug: String,
    pub title: String,
    /// Free-form blocks keyed by section name (hero, about, contact, ...).
    #[serde(default)]
    pub sections: Map<String, Value>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Partial page edit. A `null` section value removes that section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub slug: String,
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub issued_on: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub credential_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    #[serde(default)]
    pub pages: BTreeMap<String, PageContent>,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
}

impl Default for SiteContent {
    fn default() -> Self {
        let mut pages = BTreeMap::new();
        for (slug, title) in [("home", "Home"), ("articles", "Articles"), ("certifications", "Certifications")] {
            pages.insert(
                slug.to_string(),
                PageContent { slug: slug.to_string(), title: title.to_string(), sections: Map::new(), updated_at: None, updated_by: None },
            );
        }
        Self { pages, articles: Vec::new(), certifications: Vec::new() }
    }
}

/// Slugs are lower-case ASCII letters, digits and single dashes.
pub fn validate_slug(slug: &str) -> AppResult<()> {
    let ok = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !ok {
        return Err(AppError::user("invalid_slug", format!("invalid slug '{}'", slug).as_str()));
    }
    Ok(())
}

fn require_text(field: &str, v: &str) -> AppResult<()> {
    if v.trim().is_empty() {
        return Err(AppError::user("missing_field", format!("{} must not be blank", field).as_str()));
    }
    Ok(())
}

/// Write `<path>.next` and rename it over `path`.
fn persist(path: &Path, content: &SiteContent) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
    }
    let mut next = path.as_os_str().to_owned();
    next.push(".next");
    let next_path = PathBuf::from(next);
    {
        let mut f = File::create(&next_path).with_context(|| format!("create {}", next_path.display()))?;
        f.write_all(serde_json::to_string_pretty(content)?.as_bytes())?;
        f.flush()?;
        let _ = f.sync_all();
    }
    std::fs::rename(&next_path, path)
        .with_context(|| format!("rename {} -> {}", next_path.display(), path.display()))?;
    Ok(())
}

pub struct ContentStore {
    inner: RwLock<SiteContent>,
    path: Option<PathBuf>,
}

impl ContentStore {
    pub fn in_memory(seed: SiteContent) -> Self {
        Self { inner: RwLock::new(seed), path: None }
    }

    /// Load from `path`; a missing file starts from the default pages and is
    /// created on the first edit.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = if path.exists() {
            let text = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str::<SiteContent>(&text).with_context(|| format!("parse {}", path.display()))?
        } else {
            info!(target: "startup", "content file {} not found; starting from defaults", path.display());
            SiteContent::default()
        };
        Ok(Self { inner: RwLock::new(content), path: Some(path) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> SiteContent {
        self.inner.read().clone()
    }

    pub fn page(&self, slug: &str) -> AppResult<PageContent> {
        self.inner
            .read()
            .pages
            .get(slug)
            .cloned()
            .ok_or_else(|| AppError::not_found("page_not_found", format!("no page '{}'", slug).as_str()))
    }

    pub fn pages(&self) -> Vec<PageContent> {
        self.inner.read().pages.values().cloned().collect()
    }

    /// Newest first; undated articles last.
    pub fn articles(&self) -> Vec<Article> {
        let mut out = self.inner.read().articles.clone();
        out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        out
    }

    pub fn article(&self, slug: &str) -> AppResult<Article> {
        self.inner
            .read()
            .articles
            .iter()
            .find(|a| a.slug == slug)
            .cloned()
            .ok_or_else(|| AppError::not_found("article_not_found", format!("no article '{}'", slug).as_str()))
    }

    pub fn certifications(&self) -> Vec<Certification> {
        self.inner.read().certifications.clone()
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut SiteContent) -> AppResult<T>) -> AppResult<T> {
        let mut guard = self.inner.write();
        let mut next = guard.clone();
        let out = f(&mut next)?;
        if let Some(p) = &self.path {
            persist(p, &next).map_err(|e| AppError::io("content_persist_failed", format!("{:#}", e).as_str()))?;
            debug!(target: "admin", path = %p.display(), "content persisted");
        }
        *guard = next;
        Ok(out)
    }

    pub fn update_page(&self, slug: &str, update: PageUpdate, editor: &str) -> AppResult<PageContent> {
        self.mutate(|c| {
            let page = c
                .pages
                .get_mut(slug)
                .ok_or_else(|| AppError::not_found("page_not_found", format!("no page '{}'", slug).as_str()))?;
            if let Some(title) = update.title {
                require_text("title", &title)?;
                page.title = title.trim().to_string();
            }
            if let Some(sections) = update.sections {
                for (k, v) in sections {
                    if v.is_null() {
                        page.sections.remove(&k);
                    } else {
                        page.sections.insert(k, v);
                    }
                }
            }
            page.updated_at = Some(Utc::now());
            page.updated_by = Some(editor.to_string());
            Ok(page.clone())
        })
    }

    /// Insert or replace by slug. Returns the stored article and whether it was new.
    pub fn upsert_article(&self, mut article: Article, editor: &str) -> AppResult<(Article, bool)> {
        validate_slug(&article.slug)?;
        require_text("title", &article.title)?;
        article.updated_at = Some(Utc::now());
        article.updated_by = Some(editor.to_string());
        self.mutate(move |c| {
            let created = match c.articles.iter_mut().find(|a| a.slug == article.slug) {
                Some(existing) => {
                    *existing = article.clone();
                    false
                }
                None => {
                    c.articles.push(article.clone());
                    true
                }
            };
            Ok((article, created))
        })
    }

    pub fn delete_article(&self, slug: &str) -> AppResult<()> {
        self.mutate(|c| {
            let before = c.articles.len();
            c.articles.retain(|a| a.slug != slug);
            if c.articles.len() == before {
                return Err(AppError::not_found("article_not_found", format!("no article '{}'", slug).as_str()));
            }
            Ok(())
        })
    }

    pub fn upsert_certification(&self, mut cert: Certification, editor: &str) -> AppResult<(Certification, bool)> {
        validate_slug(&cert.slug)?;
        require_text("name", &cert.name)?;
        require_text("issuer", &cert.issuer)?;
        cert.updated_at = Some(Utc::now());
        cert.updated_by = Some(editor.to_string());
        self.mutate(move |c| {
            let created = match c.certifications.iter_mut().find(|x| x.slug == cert.slug) {
                Some(existing) => {
                    *existing = cert.clone();
                    false
                }
                None => {
                    c.certifications.push(cert.clone());
                    true
                }
            };
            Ok((cert, created))
        })
    }

    pub fn delete_certification(&self, slug: &str) -> AppResult<()> {
        self.mutate(|c| {
            let before = c.certifications.len();
            c.certifications.retain(|x| x.slug != slug);
            if c.certifications.len() == before {
                return Err(AppError::not_found("certification_not_found", format!("no certification '{}'", slug).as_str()));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod content_tests;
