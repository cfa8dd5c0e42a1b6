//! Configuration loading for ci-checkout.
//!
//! Supports loading configuration from TOML files, with sensible defaults
//! for all settings.

use anyhow::{Context, Result};
use ci_checkout_core::{FetchOptions, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for ci-checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Retry policy for network commands.
    pub retry: RetryConfig,
    /// Fetch depth and tags.
    pub fetch: FetchConfig,
    /// Pull request merge settings.
    pub merge: MergeConfig,
    /// Working directory handling.
    pub repository: RepositoryConfig,
}

/// Configuration for retrying fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts.
    pub count: u32,
    /// Seconds to wait between attempts.
    pub wait_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Clone depth; 0 fetches full history.
    pub depth: u32,
    /// Fetch all tags.
    pub tags: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Merge pull requests by hand when the provider's merge is unavailable.
    pub fallback_to_manual: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Hard reset and clean the working tree before checking out.
    pub reset_before_checkout: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            count: policy.count,
            wait_secs: policy.wait.as_secs(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            fallback_to_manual: true,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.count, Duration::from_secs(self.wait_secs))
    }
}

impl FetchConfig {
    pub fn options(&self) -> FetchOptions {
        FetchOptions::new(self.depth, self.tags)
    }
}

/// Default configuration file name.
const DEFAULT_CONFIG_FILE: &str = ".ci-checkout.toml";

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from `.ci-checkout.toml` in the current directory,
    /// or use defaults if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load_or_default() -> Result<Config> {
        let path = Path::new(DEFAULT_CONFIG_FILE);

        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from the specified path, or try the default location.
    pub fn load_from(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.retry.count, 3);
        assert_eq!(config.retry.wait_secs, 5);
        assert_eq!(config.fetch.depth, 0);
        assert!(!config.fetch.tags);
        assert!(config.merge.fallback_to_manual);
        assert!(!config.repository.reset_before_checkout);
    }

    #[test]
    fn test_load_partial_config() {
        let toml_content = r#"
[fetch]
depth = 50

[merge]
fallback_to_manual = false
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        // Overridden values
        assert_eq!(config.fetch.depth, 50);
        assert!(!config.merge.fallback_to_manual);

        // Default values
        assert!(!config.fetch.tags);
        assert_eq!(config.retry.count, 3);
    }

    #[test]
    fn test_load_full_config() {
        let toml_content = r#"
[retry]
count = 5
wait_secs = 0

[fetch]
depth = 1
tags = true

[merge]
fallback_to_manual = false

[repository]
reset_before_checkout = true
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.retry.policy(), RetryPolicy::new(5, Duration::ZERO));
        assert_eq!(config.fetch.options(), FetchOptions::new(1, true));
        assert!(!config.merge.fallback_to_manual);
        assert!(config.repository.reset_before_checkout);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not valid toml {{{{").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[retry]\ncount = 1\n").unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.retry.count, 1);
    }
}
