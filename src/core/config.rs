//! Renderer configuration with documented defaults
//!
//! Every selector-like name the renderer relies on is collected here so a
//! host page with different markup conventions can be described in one TOML
//! file instead of code.

use crate::core::error::{EntityError, Result};
use serde::Deserialize;
use std::path::Path;

/// Conventional document name when neither the caller nor the page names one
pub const DEFAULT_SOURCE: &str = "readme.json";

/// Default delay between a fade-triggering click and the navigation
pub const DEFAULT_CLICK_DELAY_MS: u64 = 360;

/// Per-call options for [`crate::renderer::EntityRenderer::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Delay before navigating after a fade-triggering click
    pub click_delay_ms: u64,
    /// Force a fresh fetch, bypassing (and not populating) any cache
    pub bypass_cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            click_delay_ms: DEFAULT_CLICK_DELAY_MS,
            bypass_cache: true,
        }
    }
}

/// Configuration for the renderer and the page conventions it targets
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Source used when the container carries no data attribute and the
    /// caller passes none
    pub default_source: String,

    /// Delay before navigating after a fade-triggering click (ms)
    ///
    /// Should match the duration of the page's fade-out transition.
    /// Zero navigates on the next scheduler turn.
    pub click_delay_ms: u64,

    /// Whether loads bypass the fetcher's response cache
    pub bypass_cache: bool,

    /// Classes that mark an anchor element as a navigable link
    ///
    /// A link matches if it carries any one of them.
    pub link_classes: Vec<String>,

    /// Class added to the page body while a delayed navigation is pending
    pub fade_class: String,

    /// Class of the `main` element that hosts the entity page
    pub container_class: String,

    /// Attribute on the container naming the JSON source for auto-init
    pub source_attribute: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            default_source: DEFAULT_SOURCE.to_string(),
            click_delay_ms: DEFAULT_CLICK_DELAY_MS,
            bypass_cache: true,
            link_classes: vec!["is-link".to_string(), "back-button".to_string()],
            fade_class: "page-fade-out".to_string(),
            container_class: "container".to_string(),
            source_attribute: "data-json".to_string(),
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RendererConfig = toml::from_str(content)
            .map_err(|e| EntityError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate().map_err(EntityError::Config)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EntityError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.default_source.trim().is_empty() {
            return Err("default_source must not be empty".into());
        }

        if self.link_classes.iter().any(|c| c.trim().is_empty()) {
            return Err("link_classes must not contain empty names".into());
        }

        if self.fade_class.trim().is_empty() {
            return Err("fade_class must not be empty".into());
        }

        if !self.source_attribute.starts_with("data-") {
            return Err(format!(
                "source_attribute ({}) should be a data-* attribute",
                self.source_attribute
            ));
        }

        Ok(())
    }

    /// Options for a load driven by this config
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            click_delay_ms: self.click_delay_ms,
            bypass_cache: self.bypass_cache,
        }
    }
}
