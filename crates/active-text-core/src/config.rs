//! Configuration types for active text.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::{ElementKind, Error};

/// Top-level configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ActiveTextConfig {
    /// Scan settings
    pub scan: ScanSettings,
    /// Interaction settings
    pub interaction: InteractionSettings,
}

impl ActiveTextConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: ActiveTextConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        self.scan.validate()?;
        self.interaction.validate()?;
        Ok(())
    }
}

/// Settings that drive a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanSettings {
    /// Kinds to extract, in scan order (URLs always run first)
    pub enabled_kinds: Vec<ElementKind>,
    /// Maximum URL length before truncation (None = no limit)
    pub url_max_length: Option<usize>,
    /// Custom pattern definitions
    pub custom_patterns: Vec<CustomPatternConfig>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            enabled_kinds: vec![ElementKind::Mention, ElementKind::Hashtag, ElementKind::Url],
            url_max_length: None,
            custom_patterns: vec![],
        }
    }
}

impl ScanSettings {
    /// Whether a kind is enabled.
    pub fn is_enabled(&self, kind: &ElementKind) -> bool {
        self.enabled_kinds.contains(kind)
    }

    /// Pattern registered for a custom tag.
    pub fn custom_pattern(&self, tag: &str) -> Option<&str> {
        self.custom_patterns
            .iter()
            .find(|p| p.tag == tag)
            .map(|p| p.pattern.as_str())
    }

    /// Register (or replace) the pattern for a custom tag.
    pub fn set_custom_pattern(&mut self, tag: impl Into<String>, pattern: impl Into<String>) {
        let tag = tag.into();
        let pattern = pattern.into();
        match self.custom_patterns.iter_mut().find(|p| p.tag == tag) {
            Some(existing) => existing.pattern = pattern,
            None => self.custom_patterns.push(CustomPatternConfig { tag, pattern }),
        }
    }

    /// Validate the settings.
    pub fn validate(&self) -> crate::Result<()> {
        if self.url_max_length == Some(0) {
            return Err(Error::Config("scan.url_max_length must be > 0".to_string()));
        }

        let mut tags = HashSet::new();
        for pattern in &self.custom_patterns {
            pattern.validate()?;
            if !tags.insert(pattern.tag.as_str()) {
                return Err(Error::Config(format!(
                    "custom pattern tag '{}' is defined more than once",
                    pattern.tag
                )));
            }
        }

        for kind in &self.enabled_kinds {
            if let ElementKind::Custom(tag) = kind {
                if !tags.contains(tag.as_str()) {
                    return Err(Error::Config(format!(
                        "enabled kind '{kind}' has no custom pattern"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Custom pattern configuration.
///
/// The pattern is not compiled here: an invalid pattern degrades to zero
/// matches at scan time instead of rejecting the whole configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomPatternConfig {
    /// Tag identifying the custom kind
    pub tag: String,
    /// Regular expression pattern
    pub pattern: String,
}

impl CustomPatternConfig {
    /// Create a new custom pattern definition.
    pub fn new(tag: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            pattern: pattern.into(),
        }
    }

    /// Validate the pattern configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.tag.trim().is_empty() {
            return Err(Error::Config(
                "custom pattern tag cannot be empty".to_string(),
            ));
        }

        if self.pattern.is_empty() {
            return Err(Error::Config(format!(
                "custom pattern '{}' cannot be empty",
                self.tag
            )));
        }

        Ok(())
    }
}

/// Interaction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InteractionSettings {
    /// How long a tapped element stays highlighted, in milliseconds
    pub feedback_delay_ms: u64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            feedback_delay_ms: 250,
        }
    }
}

impl InteractionSettings {
    /// Feedback delay as a duration.
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    /// Validate the settings.
    pub fn validate(&self) -> crate::Result<()> {
        if self.feedback_delay_ms > 10_000 {
            return Err(Error::Config(
                "interaction.feedback_delay_ms must be <= 10000".to_string(),
            ));
        }
        Ok(())
    }
}
