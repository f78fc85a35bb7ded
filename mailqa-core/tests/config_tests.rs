// Tests for configuration loading

use mailqa_core::config::{API_KEY_ENV, Config, default_config_template};
use mailqa_core::error::ConfigError;
use mailqa_scanner::UtmSubject;
use std::io::Write;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_partial_file_keeps_defaults() {
    let config = Config::from_toml_str(
        r#"
        [probe]
        timeout_secs = 10
        "#,
    )
    .unwrap();

    assert_eq!(config.probe.timeout(), Duration::from_secs(10));
    assert_eq!(config.probe.concurrency, 1);
    assert_eq!(config.review.model, "gpt-4o-mini");
}

#[test]
fn test_full_file() {
    let config = Config::from_toml_str(
        r#"
        [probe]
        timeout_secs = 3
        concurrency = 8
        utm_marker = "mc_cid"
        utm_subject = "normalized"
        dedupe_links = true
        user_agent = "qa-bot/1.0"

        [review]
        enabled = true
        api_key = "sk-file"
        model = "gpt-4o"
        base_url = "http://localhost:8080/v1"
        timeout_secs = 30
        "#,
    )
    .unwrap();

    assert_eq!(config.probe.concurrency, 8);
    assert_eq!(config.probe.utm_marker, "mc_cid");
    assert_eq!(config.probe.utm_subject, UtmSubject::Normalized);
    assert!(config.probe.dedupe_links);
    assert_eq!(config.probe.user_agent.as_deref(), Some("qa-bot/1.0"));
    assert!(config.review.is_enabled());
    assert_eq!(config.review.base_url, "http://localhost:8080/v1");
}

#[test]
fn test_invalid_file_is_parse_error() {
    let result = Config::from_toml_str("[probe]\ntimeout_secs = \"soon\"\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_explicit_path() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "[review]\nenabled = false")?;

    let config = Config::load(Some(file.path()))?;
    assert!(!config.review.enabled);
    Ok(())
}

#[test]
fn test_load_missing_explicit_path_fails() {
    let dir = TempDir::new().unwrap();
    let result = Config::load(Some(&dir.path().join("nope.toml")));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

// ============================================================================
// Credential Tests
// ============================================================================

#[test]
fn test_env_key_fills_missing_credential() {
    let mut config = Config::default();
    config.apply_env_with(|name| (name == API_KEY_ENV).then(|| "sk-env".to_string()));

    assert_eq!(config.review.api_key.as_deref(), Some("sk-env"));
    assert!(config.review.is_enabled());
}

#[test]
fn test_file_key_wins_over_env() {
    let mut config = Config::from_toml_str("[review]\napi_key = \"sk-file\"").unwrap();
    config.apply_env_with(|_| Some("sk-env".to_string()));

    assert_eq!(config.review.api_key.as_deref(), Some("sk-file"));
}

#[test]
fn test_blank_env_key_is_ignored() {
    let mut config = Config::default();
    config.apply_env_with(|_| Some("  ".to_string()));

    assert!(!config.review.has_credential());
    assert!(!config.review.is_enabled());
}

#[test]
fn test_disabled_review_ignores_key() {
    let mut config = Config::from_toml_str("[review]\nenabled = false").unwrap();
    config.apply_env_with(|_| Some("sk-env".to_string()));

    assert!(config.review.has_credential());
    assert!(!config.review.is_enabled());
}

// ============================================================================
// Template Tests
// ============================================================================

#[test]
fn test_template_mentions_env_var() {
    assert!(default_config_template().contains(API_KEY_ENV));
}

#[test]
fn test_round_trip_through_toml() {
    let mut config = Config::default();
    config.probe.concurrency = 4;
    let rendered = config.to_toml_string().unwrap();
    assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);
}
