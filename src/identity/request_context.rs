use axum::http::HeaderMap;

use super::Identity;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub identity: Option<Identity>,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap, identity: Option<Identity>) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { identity, request_id }
    }

    /// Editor label recorded on content changes.
    pub fn editor(&self) -> String {
        self.identity
            .as_ref()
            .and_then(|i| i.email().map(|e| e.to_lowercase()).or_else(|| i.user_id.clone()))
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("-")
    }
}
