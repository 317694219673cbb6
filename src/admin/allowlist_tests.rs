use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k: &str| map.get(k).cloned()
}

#[test]
fn parse_counts_distinct_normalised_entries() {
    let al = Allowlist::parse(" Admin@Example.com, ops@example.com ,admin@example.COM,, ").unwrap();
    assert_eq!(al.len(), 2);
    assert_eq!(al.entries(), vec!["admin@example.com".to_string(), "ops@example.com".to_string()]);
}

#[test]
fn parse_rejects_blank_sources() {
    for raw in ["", "   ", ",", " , ,\t", "\n"] {
        assert_eq!(Allowlist::parse(raw), Err(AllowlistError::Empty), "raw={:?}", raw);
    }
}

#[test]
fn membership_ignores_case_and_whitespace() {
    let al = Allowlist::parse("admin@example.com,ops@example.com").unwrap();
    for e in al.entries() {
        assert!(al.is_allowed_admin_email(Some(&e)));
        assert!(al.is_allowed_admin_email(Some(&e.to_uppercase())));
        assert!(al.is_allowed_admin_email(Some(&format!(" {} ", e))));
    }
}

#[test]
fn missing_or_empty_email_is_never_allowed() {
    let al = Allowlist::parse("admin@example.com").unwrap();
    assert!(!al.is_allowed_admin_email(None));
    assert!(!al.is_allowed_admin_email(Some("")));
    assert!(!al.is_allowed_admin_email(Some("   ")));
}

#[test]
fn mixed_case_scenario() {
    let al = Allowlist::parse("Admin@Example.com, ops@example.com").unwrap();
    assert!(al.is_allowed_admin_email(Some("admin@example.com")));
    assert!(!al.is_allowed_admin_email(Some("random@example.com")));
}

#[test]
fn primary_wins_over_fallback() {
    let lookup = lookup_from(&[(PRIMARY_VAR, "a@example.com"), (FALLBACK_VAR, "b@example.com")]);
    assert_eq!(resolve_configuration_source(lookup, false), "a@example.com");
}

#[test]
fn primary_is_the_only_variable_consulted_when_set() {
    use std::cell::RefCell;
    let seen = RefCell::new(Vec::new());
    let lookup = |k: &str| {
        seen.borrow_mut().push(k.to_string());
        if k == PRIMARY_VAR {
            Some("a@example.com".to_string())
        } else {
            Some("b@example.com".to_string())
        }
    };
    let _ = resolve_configuration_source(lookup, false);
    assert_eq!(seen.into_inner(), vec![PRIMARY_VAR.to_string()]);
}

#[test]
fn blank_primary_falls_back() {
    let lookup = lookup_from(&[(PRIMARY_VAR, "   "), (FALLBACK_VAR, "b@example.com")]);
    assert_eq!(resolve_configuration_source(lookup, true), "b@example.com");
    let lookup = lookup_from(&[(FALLBACK_VAR, "b@example.com")]);
    assert_eq!(resolve_configuration_source(lookup, false), "b@example.com");
}

#[test]
fn nothing_configured_resolves_to_empty() {
    let lookup = lookup_from(&[]);
    assert_eq!(resolve_configuration_source(lookup, false), "");
    let lookup = lookup_from(&[]);
    assert_eq!(Allowlist::parse(&resolve_configuration_source(lookup, false)), Err(AllowlistError::Empty));
}

#[test]
fn production_like_names() {
    assert!(is_production_like(Some("production")));
    assert!(is_production_like(Some(" Staging ")));
    assert!(is_production_like(Some("PROD")));
    assert!(!is_production_like(Some("development")));
    assert!(!is_production_like(None));
}

#[test]
fn error_message_names_the_condition() {
    assert!(AllowlistError::Empty.to_string().starts_with("no authorized administrator configured"));
}
