//! Runtime configuration (strata.toml)
//!
//! The object model consults configuration in exactly one place: the
//! implicit-accessor capability falls back to
//! `applicationSettings.invokeImplicitAccessor` when a class carries no
//! annotation. That lookup goes through [`ConfigLookup`] so hosts can plug in
//! their own settings store.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_sdk::{keys, Key, Value};
use thiserror::Error;

use crate::defaults;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Ambient configuration lookup
pub trait ConfigLookup: Send + Sync {
    /// Value of `item` within `section`, if configured
    fn config_item(&self, section: &Key, item: &Key) -> Option<Value>;
}

impl fmt::Debug for dyn ConfigLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfigLookup")
    }
}

/// Runtime configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// Application-wide settings
    #[serde(default)]
    pub application_settings: ApplicationSettings,

    /// Class defaults
    #[serde(default)]
    pub classes: ClassDefaults,
}

/// `[application_settings]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApplicationSettings {
    /// Global implicit-accessor switch; absent means "use the source-type default"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke_implicit_accessor: Option<bool>,
}

/// `[classes]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassDefaults {
    /// Generated accessors for classes without an `accessors` annotation
    #[serde(default = "default_accessors")]
    pub accessors: bool,
}

fn default_accessors() -> bool {
    defaults::DEFAULT_ACCESSORS
}

impl Default for ClassDefaults {
    fn default() -> Self {
        Self {
            accessors: default_accessors(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl ConfigLookup for RuntimeConfig {
    fn config_item(&self, section: &Key, item: &Key) -> Option<Value> {
        if *section == *keys::APPLICATION_SETTINGS && *item == *keys::INVOKE_IMPLICIT_ACCESSOR {
            return self.application_settings.invoke_implicit_accessor.map(Value::Bool);
        }
        if section.matches("classes") && *item == *keys::ACCESSORS {
            return Some(Value::Bool(self.classes.accessors));
        }
        None
    }
}

/// Options a [`Runtime`](crate::Runtime) is created with
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Ambient configuration lookup
    pub config: Arc<dyn ConfigLookup>,
    /// Generated accessors for classes without an `accessors` annotation
    pub accessors_by_default: bool,
}

impl RuntimeOptions {
    /// Options backed by a parsed configuration file
    pub fn from_config(config: RuntimeConfig) -> Self {
        let accessors_by_default = config.classes.accessors;
        RuntimeOptions {
            config: Arc::new(config),
            accessors_by_default,
        }
    }

    /// Replace the configuration lookup
    pub fn with_lookup(mut self, config: Arc<dyn ConfigLookup>) -> Self {
        self.config = config;
        self
    }

    /// Set the accessor default
    pub fn with_accessors_by_default(mut self, enabled: bool) -> Self {
        self.accessors_by_default = enabled;
        self
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self::from_config(RuntimeConfig::default())
    }
}
