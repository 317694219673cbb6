//!
//! folio server configuration
//! --------------------------
//! Settings come from environment variables; CLI flags override them.
//! The admin allowlist is configured separately (see `admin::allowlist`).

use std::net::IpAddr;

use crate::admin::GatePolicy;
use crate::identity::{DEFAULT_EMAIL_HEADER, DEFAULT_USER_HEADER};

pub const DEFAULT_HTTP_PORT: u16 = 7878;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_CONTENT_PATH: &str = "content/site.json";

pub const USAGE: &str = "folio server\n\nUSAGE:\n  folio [--port N] [--bind ADDR] [--content PATH]\n\nOPTIONS:\n  --port N         HTTP port (env: FOLIO_HTTP_PORT, default 7878)\n  --bind ADDR      Listen address (env: FOLIO_BIND, default 0.0.0.0)\n  --content PATH   Site content JSON (env: FOLIO_CONTENT_PATH, default content/site.json)\n\nADMIN:\n  ADMIN_EMAIL_ALLOWLIST   comma-separated admin emails (required)\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub http_port: u16,
    pub bind: IpAddr,
    pub content_path: String,
    pub environment: Option<String>,
    pub gate: GatePolicy,
    pub identity_email_header: String,
    pub identity_user_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            bind: IpAddr::from([0, 0, 0, 0]),
            content_path: DEFAULT_CONTENT_PATH.to_string(),
            environment: None,
            gate: GatePolicy::default(),
            identity_email_header: DEFAULT_EMAIL_HEADER.to_string(),
            identity_user_header: DEFAULT_USER_HEADER.to_string(),
        }
    }
}

pub fn parse_port(val: &str) -> Option<u16> {
    val.trim().parse::<u16>().ok()
}

/// Value following `flag` in `args`, if any.
pub fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            return args.get(i + 1).map(|s| s.as_str()).filter(|s| !s.starts_with("--"));
        }
        i += 1;
    }
    None
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Paths used by the gate must be absolute site paths.
fn site_path(v: String) -> Option<String> {
    let v = v.trim().to_string();
    if v.starts_with('/') && !v.starts_with("//") {
        Some(v)
    } else {
        None
    }
}

impl ServerConfig {
    /// Build from a variable lookup and CLI args. Unparseable values fall back
    /// to defaults with a warning.
    pub fn from_sources<F>(lookup: F, args: &[String]) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |k: &str| lookup(k).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let mut cfg = ServerConfig::default();

        let port = arg_value(args, "--port").map(str::to_string).or_else(|| env("FOLIO_HTTP_PORT"));
        if let Some(p) = port {
            match parse_port(&p) {
                Some(n) => cfg.http_port = n,
                None => tracing::warn!(target: "startup", "ignoring invalid port '{}'", p),
            }
        }
        let bind = arg_value(args, "--bind").map(str::to_string).or_else(|| env("FOLIO_BIND"));
        if let Some(b) = bind {
            match b.parse::<IpAddr>() {
                Ok(ip) => cfg.bind = ip,
                Err(_) => tracing::warn!(target: "startup", "ignoring invalid bind address '{}'", b),
            }
        }
        if let Some(p) = arg_value(args, "--content").map(str::to_string).or_else(|| env("FOLIO_CONTENT_PATH")) {
            cfg.content_path = p;
        }
        cfg.environment = env(crate::admin::allowlist::ENV_VAR);

        for (var, slot) in [
            ("FOLIO_SIGN_IN_PATH", &mut cfg.gate.sign_in_path),
            ("FOLIO_DENIED_PATH", &mut cfg.gate.denied_path),
            ("FOLIO_HOME_PATH", &mut cfg.gate.home_path),
            ("FOLIO_ADMIN_PATH", &mut cfg.gate.admin_home_path),
        ] {
            if let Some(v) = env(var) {
                match site_path(v) {
                    Some(p) => *slot = p,
                    None => tracing::warn!(target: "startup", "{} must be a site path starting with '/'; keeping default", var),
                }
            }
        }
        if let Some(h) = env("FOLIO_IDENTITY_EMAIL_HEADER") {
            cfg.identity_email_header = h.to_ascii_lowercase();
        }
        if let Some(h) = env("FOLIO_IDENTITY_USER_HEADER") {
            cfg.identity_user_header = h.to_ascii_lowercase();
        }
        cfg
    }

    pub fn from_env_and_args(args: &[String]) -> Self {
        Self::from_sources(|k| std::env::var(k).ok(), args)
    }

    pub fn production_like(&self) -> bool {
        crate::admin::allowlist::is_production_like(self.environment.as_deref())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
