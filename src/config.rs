//! Configuration file parser for ~/.config/trail/feed.toml.
//!
//! The config file is optional — a missing file yields
//! `FeedConfig::default()`. Unknown keys are silently ignored by serde,
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Tuning knobs for the feed engine.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
///
/// A custom Debug impl masks `auth_token` to prevent secret leakage in
/// logs, error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Items requested per page from the trending collection.
    pub trending_page_size: u32,

    /// Items requested per page from the friends collection.
    pub friends_page_size: u32,

    /// Trending half of the interleave ratio: this many trending cards...
    pub ratio_trending: u32,

    /// ...then this many friends cards, repeating.
    pub ratio_friends: u32,

    /// Comments requested per page when a comment sheet opens or pages.
    pub comment_page_size: u32,

    /// Whether a failed like toggle rolls back silently (no error
    /// surfaced to the caller) or returns the failure for messaging.
    pub silent_like_failures: bool,

    /// Base URL of the Trail backend.
    pub base_url: String,

    /// Bearer token for the backend (alternative to TRAIL_API_TOKEN
    /// env var). Env var takes precedence over config file.
    pub auth_token: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            trending_page_size: 10,
            friends_page_size: 10,
            ratio_trending: 1,
            ratio_friends: 3,
            comment_page_size: 20,
            silent_like_failures: true,
            base_url: "https://api.ontrail.app".to_string(),
            auth_token: None,
        }
    }
}

/// Mask auth_token in Debug output to prevent secret leakage.
impl std::fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConfig")
            .field("trending_page_size", &self.trending_page_size)
            .field("friends_page_size", &self.friends_page_size)
            .field("ratio_trending", &self.ratio_trending)
            .field("ratio_friends", &self.ratio_friends)
            .field("comment_page_size", &self.comment_page_size)
            .field("silent_like_failures", &self.silent_like_failures)
            .field("base_url", &self.base_url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl FeedConfig {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(FeedConfig::default())`
    /// - Empty file → `Ok(FeedConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to prevent memory exhaustion
        // from a corrupted or maliciously large config file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "trending_page_size",
                "friends_page_size",
                "ratio_trending",
                "ratio_friends",
                "comment_page_size",
                "silent_like_failures",
                "base_url",
                "auth_token",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: FeedConfig = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// Resolve the bearer token, with the TRAIL_API_TOKEN environment
    /// variable taking precedence over the config file.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var("TRAIL_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.auth_token.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
