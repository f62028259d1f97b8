//! Engine configuration
//!
//! Configuration can be built in code with the `with_*` builders or loaded
//! from a TOML file:
//!
//! ```toml
//! views_root = "resources/views"
//! extension = "html"
//! max_chain_depth = 32
//! strict_variables = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for the template engine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory that dot-delimited template names are resolved against
    pub views_root: PathBuf,

    /// File extension appended to every resolved template path
    pub extension: String,

    /// Maximum number of templates visited through `@extends` in one render
    pub max_chain_depth: usize,

    /// Maximum nesting of `@include`
    pub max_include_depth: usize,

    /// Fail on undefined variables instead of rendering them as empty text
    pub strict_variables: bool,

    /// Keep parsed templates in memory between renders
    pub cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            views_root: PathBuf::from("views"),
            extension: "html".to_string(),
            max_chain_depth: 32,
            max_include_depth: 16,
            strict_variables: false,
            cache: true,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// A relative `views_root` is taken relative to the directory holding
    /// the config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        if config.views_root.is_relative() {
            if let Some(dir) = path.parent() {
                config.views_root = dir.join(&config.views_root);
            }
        }
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the views root directory
    pub fn with_views_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.views_root = root.into();
        self
    }

    /// Set the template file extension (with or without the leading dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the maximum inheritance chain length
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Set the maximum include nesting
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Enable or disable strict variable lookup
    pub fn with_strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    /// Enable or disable the parsed template cache
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }
}
