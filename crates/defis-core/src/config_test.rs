use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "DEFIS_ENV"));
}

#[test]
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.sources_path.is_none());
    assert_eq!(cfg.fetch_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "defis/0.1 (pharma-dashboard)");
    assert_eq!(cfg.fetch_max_retries, 3);
    assert_eq!(cfg.fetch_retry_backoff_ms, 1000);
    assert_eq!(cfg.text_encodings, TextEncoding::DEFAULT_ORDER.to_vec());
    assert!(cfg.admin_token.is_none());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("DEFIS_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEFIS_BIND_ADDR"),
        "expected InvalidEnvVar(DEFIS_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fetch_timeout_override() {
    let mut map = HashMap::new();
    map.insert("DEFIS_FETCH_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.fetch_timeout_secs, 60);
}

#[test]
fn build_app_config_fetch_max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("DEFIS_FETCH_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEFIS_FETCH_MAX_RETRIES"),
        "expected InvalidEnvVar(DEFIS_FETCH_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn build_app_config_blank_sources_path_is_ignored() {
    let mut map = HashMap::new();
    map.insert("DEFIS_SOURCES_PATH", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.sources_path.is_none());
}

#[test]
fn build_app_config_reads_sources_path_and_admin_token() {
    let mut map = HashMap::new();
    map.insert("DEFIS_SOURCES_PATH", "./config/sources.yaml");
    map.insert("DEFIS_ADMIN_TOKEN", "s3cret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.sources_path.as_deref(),
        Some(std::path::Path::new("./config/sources.yaml"))
    );
    assert_eq!(cfg.admin_token.as_deref(), Some("s3cret"));
    assert!(!format!("{cfg:?}").contains("s3cret"));
}

#[test]
fn text_encodings_keep_order_and_drop_repeats() {
    let mut map = HashMap::new();
    map.insert("DEFIS_TEXT_ENCODINGS", "latin1, UTF-8 ,latin-1");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.text_encodings,
        vec![TextEncoding::Latin1, TextEncoding::Utf8]
    );
}

#[test]
fn text_encodings_reject_unknown_names() {
    let mut map = HashMap::new();
    map.insert("DEFIS_TEXT_ENCODINGS", "utf-8,cp1252");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, ref reason }) if var == "DEFIS_TEXT_ENCODINGS" && reason.contains("cp1252")),
        "expected InvalidEnvVar(DEFIS_TEXT_ENCODINGS), got: {result:?}"
    );
}
