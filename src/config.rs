use crate::error::{FeedError, FeedResult};
use crate::feeds::token::Credentials;
use crate::twitter_parser::{TextAnnotator, DEFAULT_HASHTAG_BASE, DEFAULT_PROFILE_BASE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound the user timeline endpoint accepts for `count`.
pub const API_MAX_COUNT: u32 = 200;

const API_KEY_ENV: &str = "TWITTER_API_KEY";
const API_SECRET_ENV: &str = "TWITTER_API_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub block: BlockConfig,
}

/// Site-wide settings shared by every feed block.
#[derive(Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// Administrative ceiling for how many tweets a block may show.
    #[serde(default = "default_max_tweets")]
    pub max_tweets: u32,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Prefix for hashtag links, followed by the tag.
    #[serde(default = "default_hashtag_base")]
    pub hashtag_base: String,
    /// Prefix for mention links, followed by the username.
    #[serde(default = "default_profile_base")]
    pub profile_base: String,
}

/// Per-block settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_num_tweets")]
    pub num_tweets: u32,
}

fn default_max_tweets() -> u32 {
    20
}

fn default_api_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_hashtag_base() -> String {
    DEFAULT_HASHTAG_BASE.to_string()
}

fn default_profile_base() -> String {
    DEFAULT_PROFILE_BASE.to_string()
}

fn default_num_tweets() -> u32 {
    5
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            max_tweets: default_max_tweets(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            hashtag_base: default_hashtag_base(),
            profile_base: default_profile_base(),
        }
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            num_tweets: default_num_tweets(),
        }
    }
}

impl std::fmt::Debug for TwitterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("max_tweets", &self.max_tweets)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("hashtag_base", &self.hashtag_base)
            .field("profile_base", &self.profile_base)
            .finish()
    }
}

impl TwitterConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key.clone(), self.api_secret.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn annotator(&self) -> TextAnnotator {
        TextAnnotator::new(self.hashtag_base.clone(), self.profile_base.clone())
    }

    /// Base URL without a trailing slash, ready for endpoint paths.
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

impl Config {
    /// Default location: `<config dir>/twitter-feed/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("twitter-feed").join("config.toml"))
    }

    pub fn from_toml_str(content: &str) -> FeedResult<Self> {
        toml::from_str(content).map_err(|e| FeedError::Config(format!("invalid config: {e}")))
    }

    /// Read a config file, then apply environment overrides.
    pub fn load(path: &Path) -> FeedResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeedError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Credentials from the environment take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply credential overrides from `lookup`; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.twitter.api_key = key;
        }
        if let Some(secret) = lookup(API_SECRET_ENV).filter(|v| !v.is_empty()) {
            self.twitter.api_secret = secret;
        }
    }

    pub fn validate(&self) -> FeedResult<()> {
        if self.twitter.api_key.trim().is_empty() {
            return Err(FeedError::Config("twitter.api_key is required".into()));
        }
        if self.twitter.api_secret.trim().is_empty() {
            return Err(FeedError::Config("twitter.api_secret is required".into()));
        }
        if self.twitter.max_tweets > API_MAX_COUNT {
            return Err(FeedError::Config(format!(
                "twitter.max_tweets must be at most {API_MAX_COUNT}, got {}",
                self.twitter.max_tweets
            )));
        }
        if self.twitter.timeout_secs == 0 {
            return Err(FeedError::Config(
                "twitter.timeout_secs must be greater than zero".into(),
            ));
        }
        if normalize_username(&self.block.username).is_empty() {
            return Err(FeedError::Config("block.username is required".into()));
        }
        if self.block.username.chars().count() > 512 {
            return Err(FeedError::Config(
                "block.username must be at most 512 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Trim whitespace and a single leading `@`.
pub fn normalize_username(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed)
}
