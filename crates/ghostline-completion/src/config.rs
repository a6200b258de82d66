//! Configuration loading and merging for the completion service
//!
//! Defaults are `{debounce_time: 200ms, text_limits: {8000, 1000},
//! suggestion_cache: {enabled: true}}`. User-supplied overrides are
//! partial and deep-merged over the defaults, so a caller can set
//! `text_limits.before_cursor` without losing the `after_cursor` default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CompletionError, CompletionResult};
use crate::types::TextLimits;

/// Suggestion cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionCacheConfig {
    /// Whether continued typing may be satisfied from the cached batch
    pub enabled: bool,
}

impl Default for SuggestionCacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Resolved completion service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionConfig {
    /// Trailing debounce window for backend requests, in milliseconds
    pub debounce_time: u64,
    pub text_limits: TextLimits,
    pub suggestion_cache: SuggestionCacheConfig,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            debounce_time: 200,
            text_limits: TextLimits::default(),
            suggestion_cache: SuggestionCacheConfig::default(),
        }
    }
}

/// Partial text limit overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextLimitsOverrides {
    pub before_cursor: Option<usize>,
    pub after_cursor: Option<usize>,
}

/// Partial cache overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionCacheOverrides {
    pub enabled: Option<bool>,
}

/// User-supplied partial configuration, merged over the defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompletionConfigOverrides {
    pub debounce_time: Option<u64>,
    pub text_limits: Option<TextLimitsOverrides>,
    pub suggestion_cache: Option<SuggestionCacheOverrides>,
}

impl CompletionConfig {
    /// Deep-merge partial overrides over this configuration
    pub fn with_overrides(mut self, overrides: CompletionConfigOverrides) -> Self {
        if let Some(debounce_time) = overrides.debounce_time {
            self.debounce_time = debounce_time;
        }
        if let Some(limits) = overrides.text_limits {
            if let Some(before_cursor) = limits.before_cursor {
                self.text_limits.before_cursor = before_cursor;
            }
            if let Some(after_cursor) = limits.after_cursor {
                self.text_limits.after_cursor = after_cursor;
            }
        }
        if let Some(cache) = overrides.suggestion_cache {
            if let Some(enabled) = cache.enabled {
                self.suggestion_cache.enabled = enabled;
            }
        }
        self
    }

    /// Resolve a configuration from optional overrides, validated
    pub fn resolve(overrides: Option<CompletionConfigOverrides>) -> CompletionResult<Self> {
        let config = match overrides {
            Some(overrides) => Self::default().with_overrides(overrides),
            None => Self::default(),
        };
        ConfigLoader::validate_config(&config)?;
        Ok(config)
    }
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

/// Completion configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load completion configuration overrides from a YAML file
    pub fn load_from_yaml(path: &Path) -> CompletionResult<CompletionConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, ConfigFormat::Yaml)
    }

    /// Load completion configuration overrides from a JSON file
    pub fn load_from_json(path: &Path) -> CompletionResult<CompletionConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, ConfigFormat::Json)
    }

    /// Load completion configuration overrides from a string
    pub fn load_from_string(content: &str, format: ConfigFormat) -> CompletionResult<CompletionConfig> {
        let overrides: CompletionConfigOverrides = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        let config = CompletionConfig::default().with_overrides(overrides);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Validate a resolved configuration
    fn validate_config(config: &CompletionConfig) -> CompletionResult<()> {
        if config.text_limits.before_cursor == 0 {
            return Err(CompletionError::config(
                "textLimits.beforeCursor must be greater than zero",
            ));
        }
        if config.text_limits.after_cursor == 0 {
            return Err(CompletionError::config(
                "textLimits.afterCursor must be greater than zero",
            ));
        }
        Ok(())
    }
}
