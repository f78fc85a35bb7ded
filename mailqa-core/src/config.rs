// Configuration file handling

use crate::error::ConfigError;
use mailqa_scanner::UtmSubject;
use mailqa_scanner::classify::DEFAULT_UTM_MARKER;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/mailqa/config.toml";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub utm_marker: String,
    pub utm_subject: UtmSubject,
    pub dedupe_links: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            concurrency: 1,
            utm_marker: DEFAULT_UTM_MARKER.to_string(),
            utm_subject: UtmSubject::Raw,
            dedupe_links: false,
            user_agent: None,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
        }
    }
}

// Keeps the key out of logs and debug output.
impl std::fmt::Debug for ReviewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ReviewConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// The review runs only when switched on and a key is present.
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.has_credential()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !explicit && !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Fill the API key from the process environment if the file had none.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.review.has_credential()
            && let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty())
        {
            debug!("Using AI review key from {}", API_KEY_ENV);
            self.review.api_key = Some(key);
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Commented starter file written by `mailqa init`.
pub fn default_config_template() -> String {
    let defaults = Config::default();
    format!(
        r#"# mailqa configuration

[probe]
# Seconds to wait for each link before marking it Broken
timeout_secs = {timeout}
# Links probed at once; 1 checks them strictly one after another
concurrency = {concurrency}
# Substring that marks a link as tagged for analytics
utm_marker = "{marker}"
# "raw" checks the href as written, "normalized" checks the unwrapped SafeLinks destination
utm_subject = "raw"
# Report each distinct href once instead of once per occurrence
dedupe_links = {dedupe}

[review]
enabled = {enabled}
# Falls back to the {env} environment variable when unset
# api_key = "sk-..."
model = "{model}"
base_url = "{base_url}"
timeout_secs = {review_timeout}
"#,
        timeout = defaults.probe.timeout_secs,
        concurrency = defaults.probe.concurrency,
        marker = defaults.probe.utm_marker,
        dedupe = defaults.probe.dedupe_links,
        enabled = defaults.review.enabled,
        env = API_KEY_ENV,
        model = defaults.review.model,
        base_url = defaults.review.base_url,
        review_timeout = defaults.review.timeout_secs,
    )
}
