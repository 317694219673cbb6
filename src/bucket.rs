//! Object-storage (R2) naming and public URL construction for uploaded images.
//! Only keys and URLs are built here; the upload itself happens elsewhere.

use crate::error::{AppError, AppResult};

pub const BUCKET_VAR: &str = "R2_BUCKET_NAME";
pub const PUBLIC_URL_VAR: &str = "R2_PUBLIC_URL";
pub const ACCOUNT_VAR: &str = "R2_ACCOUNT_ID";

pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/gif",
    "image/avif",
    "image/svg+xml",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    pub bucket: String,
    /// Public base, e.g. `https://cdn.example.com` or an `r2.dev` URL.
    pub public_base_url: String,
    pub account_id: Option<String>,
}

impl BucketConfig {
    pub fn new<S: Into<String>>(bucket: S, public_base_url: S) -> Self {
        Self { bucket: bucket.into(), public_base_url: public_base_url.into(), account_id: None }
    }

    /// `None` when either the bucket name or the public URL is missing.
    pub fn from_env() -> Option<Self> {
        let get = |k: &str| std::env::var(k).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let bucket = get(BUCKET_VAR)?;
        let public_base_url = get(PUBLIC_URL_VAR)?;
        Some(Self { bucket, public_base_url, account_id: get(ACCOUNT_VAR) })
    }

    /// S3-compatible API endpoint for the account.
    pub fn endpoint(&self) -> Option<String> {
        self.account_id.as_ref().map(|a| format!("https://{}.r2.cloudflarestorage.com", a))
    }

    pub fn public_url(&self, key: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        let path = key
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", base, path)
    }
}

/// Lower-case, keep `[a-z0-9._-]`, turn everything else into single dashes.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut out = String::with_capacity(base.len());
    for c in base.chars().flat_map(|c| c.to_lowercase()) {
        let keep = c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' || c == '-';
        if keep {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '.').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn sanitize_folder(folder: &str) -> AppResult<String> {
    let parts: Vec<String> = folder
        .split('/')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            if s == "." || s == ".." {
                return Err(AppError::user("invalid_folder", "folder may not contain '.' or '..'"));
            }
            sanitize_file_name(s).ok_or_else(|| AppError::user("invalid_folder", "folder segment is empty after sanitising"))
        })
        .collect::<AppResult<_>>()?;
    Ok(parts.join("/"))
}

/// `<folder>/<uuid>-<name>`; the uuid keeps repeated uploads of one file apart.
pub fn object_key(folder: &str, file_name: &str) -> AppResult<String> {
    let name = sanitize_file_name(file_name)
        .ok_or_else(|| AppError::user("invalid_file_name", "file name is empty after sanitising"))?;
    let folder = sanitize_folder(folder)?;
    let id = uuid::Uuid::new_v4();
    if folder.is_empty() {
        Ok(format!("{}-{}", id, name))
    } else {
        Ok(format!("{}/{}-{}", folder, id, name))
    }
}

pub fn is_allowed_image_type(content_type: &str) -> bool {
    let ct = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES.contains(&ct.as_str())
}
