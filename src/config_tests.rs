use super::*;
use std::collections::HashMap;

fn args(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn defaults_when_nothing_set() {
    let cfg = ServerConfig::from_sources(|_| None, &[]);
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.http_port, 7878);
    assert_eq!(cfg.gate.denied_path, "/access-denied");
    assert_eq!(cfg.gate.admin_home_path, "/admin");
    assert!(!cfg.production_like());
}

#[test]
fn cli_overrides_environment() {
    let env = env_of(&[("FOLIO_HTTP_PORT", "9000"), ("FOLIO_CONTENT_PATH", "/srv/site.json"), ("FOLIO_BIND", "127.0.0.1")]);
    let cfg = ServerConfig::from_sources(|k| env.get(k).cloned(), &args(&["folio", "--port", "9100"]));
    assert_eq!(cfg.http_port, 9100);
    assert_eq!(cfg.content_path, "/srv/site.json");
    assert_eq!(cfg.bind.to_string(), "127.0.0.1");
}

#[test]
fn invalid_values_keep_defaults() {
    let env = env_of(&[("FOLIO_HTTP_PORT", "http"), ("FOLIO_BIND", "localhost"), ("FOLIO_DENIED_PATH", "https://evil.example")]);
    let cfg = ServerConfig::from_sources(|k| env.get(k).cloned(), &[]);
    assert_eq!(cfg.http_port, DEFAULT_HTTP_PORT);
    assert_eq!(cfg.bind.to_string(), DEFAULT_BIND);
    assert_eq!(cfg.gate.denied_path, "/access-denied");
}

#[test]
fn gate_paths_and_headers_from_env() {
    let env = env_of(&[
        ("FOLIO_SIGN_IN_PATH", "/login"),
        ("FOLIO_DENIED_PATH", " /nope "),
        ("FOLIO_ADMIN_PATH", "/studio"),
        ("FOLIO_IDENTITY_EMAIL_HEADER", "X-Auth-Request-Email"),
        ("FOLIO_ENV", "production"),
    ]);
    let cfg = ServerConfig::from_sources(|k| env.get(k).cloned(), &[]);
    assert_eq!(cfg.gate.sign_in_path, "/login");
    assert_eq!(cfg.gate.denied_path, "/nope");
    assert_eq!(cfg.gate.home_path, "/");
    assert_eq!(cfg.gate.admin_home_path, "/studio");
    assert_eq!(cfg.identity_email_header, "x-auth-request-email");
    assert!(cfg.production_like());
}

#[test]
fn arg_value_ignores_missing_operand() {
    let a = args(&["folio", "--port"]);
    assert_eq!(arg_value(&a, "--port"), None);
    let a = args(&["folio", "--content", "--port", "1"]);
    assert_eq!(arg_value(&a, "--content"), None);
    assert_eq!(arg_value(&a, "--port"), Some("1"));
    assert!(has_flag(&args(&["folio", "-h"]), "-h"));
}
