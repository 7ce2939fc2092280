//! Configuration management for geez-corpus.
//!
//! Configuration is read from `~/.config/geez-corpus/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::corpus::CleaningConfig;
use crate::scraper::ScraperConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub output: OutputConfig,
    pub cleaning: CleaningConfig,
}

/// Where chapter files go when no explicit path is given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/geez-corpus/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("geez-corpus").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# geez-corpus configuration
#
# Timeouts are in seconds unless the key says otherwise. Every wait is
# bounded; nothing is retried automatically.

[scraper]
# Run browser in headless mode (no visible window)
headless = true

# Navigation budget for a chapter page
page_load_timeout_secs = 30

# Wait for the English verse table after load
content_ready_timeout_secs = 15

# Wait for a language toggle to take effect
toggle_timeout_secs = 10

# Wait when switching back to English after extraction
restore_timeout_secs = 5

# DOM readiness polling interval (milliseconds)
poll_interval_ms = 100

# Page text that marks an anti-automation challenge (case-insensitive)
blocked_marker = "captcha"

# Page structure
content_ready_selector = ".kjvBibleChapterContainer tbody tr"
default_rows_selector = ".kjvBibleChapterContainer tbody tr"
alternate_rows_selector = ".geezBibleChapterContainer tbody tr"
book_title_selector = ".kjvBibleChapterContainer .bookTitle"
chapter_title_class = "chapterTitle"
alternate_toggle_selector = "button.language.geez"
default_toggle_selector = "button.colorizer[value='0']"
default_container_selector = ".kjvBibleChapterContainer"
verse_number_class = "verseNumCell"
verse_content_class = "verseContentCell"

[output]
# Directory for chapter JSON files when no path is given
directory = "output"

[cleaning]
# Remove digits (including Ethiopic numerals)
strip_digits = true

# Remove punctuation and quotes; Ethiopic separators become spaces
strip_punctuation = true
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        let defaults = ScraperConfig::default();
        assert_eq!(config.scraper.page_load_timeout_secs, 30);
        assert_eq!(config.scraper.default_toggle_selector, defaults.default_toggle_selector);
        assert_eq!(config.scraper.alternate_rows_selector, defaults.alternate_rows_selector);
        assert_eq!(config.output.directory, PathBuf::from("output"));
        assert!(config.cleaning.strip_digits);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[scraper]
toggle_timeout_secs = 20
headless = false
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        // Custom values
        assert_eq!(config.scraper.toggle_timeout_secs, 20);
        assert!(!config.scraper.headless);
        // Default values
        assert_eq!(config.scraper.restore_timeout_secs, 5);
        assert_eq!(config.scraper.blocked_marker, "captcha");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.scraper.content_ready_timeout_secs, 15);
        assert!(config.cleaning.strip_punctuation);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scraper\nheadless = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
