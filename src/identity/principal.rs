use serde::{Deserialize, Serialize};

/// Authenticated principal for one request. Both fields come from the auth
/// collaborator and either may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: Option<String>, email: Option<String>) -> Self {
        Self { user_id, email }
    }

    pub fn with_email<S: Into<String>>(email: S) -> Self {
        Self { user_id: None, email: Some(email.into()) }
    }

    /// Email with surrounding whitespace removed; `None` when absent or blank.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}
