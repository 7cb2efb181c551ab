#![deny(unsafe_code)]

//! Configuration loading and validation for scarfconv.
//!
//! Loads TOML configuration files and validates them against expected schemas.
//! Provides the [`AppConfig`] type as the central configuration structure,
//! and the [`tool_list`] module with the typed settings the attribute passes
//! consume.

/// Typed labels and duplicate handling for the tool list document.
pub mod tool_list;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::tool_list::{DuplicatePolicy, Labels};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tool list (attribute configuration document) settings.
    #[serde(default)]
    pub tool_list: ToolListConfig,

    /// Report output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the tool list lives and how to read it.
///
/// ## TOML Example
///
/// ```toml
/// [tool_list]
/// path = "/opt/swamp/Scarf_ToolList.json"
/// duplicate_attributes = "ignore"
///
/// [tool_list.labels]
/// attribute_map = "ScarfAttributes"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListConfig {
    /// Path to the tool list JSON document.
    #[serde(default = "default_tool_list_path")]
    pub path: String,

    /// Duplicate attribute handling: "reject" or "ignore".
    #[serde(default = "default_duplicate_attributes")]
    pub duplicate_attributes: String,

    /// Reserved key labels.
    #[serde(default)]
    pub labels: LabelsConfig,
}

impl Default for ToolListConfig {
    fn default() -> Self {
        Self {
            path: default_tool_list_path(),
            duplicate_attributes: default_duplicate_attributes(),
            labels: LabelsConfig::default(),
        }
    }
}

fn default_tool_list_path() -> String {
    "Scarf_ToolList.json".to_string()
}

fn default_duplicate_attributes() -> String {
    "reject".to_string()
}

/// Reserved key labels as expressed in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    /// Key of the generic tool list. Default: `"Generic-Toollist"`.
    #[serde(default = "default_generic_tool_list_label")]
    pub generic_tool_list: String,

    /// Key of the attribute map. Default: `"ScarfAttributes"`; documents
    /// keyed `"attribute-map"` need this set, or no tool section is found.
    #[serde(default = "default_attribute_map_label")]
    pub attribute_map: String,

    #[serde(default = "default_default_attributes_label")]
    pub default_attributes: String,

    #[serde(default = "default_generic_label")]
    pub generic: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            generic_tool_list: default_generic_tool_list_label(),
            attribute_map: default_attribute_map_label(),
            default_attributes: default_default_attributes_label(),
            generic: default_generic_label(),
        }
    }
}

fn default_generic_tool_list_label() -> String {
    Labels::default().generic_tool_list
}

fn default_attribute_map_label() -> String {
    Labels::default().attribute_map
}

fn default_default_attributes_label() -> String {
    Labels::default().default_attributes
}

fn default_generic_label() -> String {
    Labels::default().generic
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the JSON report.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tool_list.path.is_empty() {
            return Err(ConfigError::Validation(
                "tool_list.path must not be empty".to_string(),
            ));
        }
        if DuplicatePolicy::from_name(&self.tool_list.duplicate_attributes).is_none() {
            return Err(ConfigError::Validation(format!(
                "tool_list.duplicate_attributes must be one of [\"reject\", \"ignore\"], got {:?}",
                self.tool_list.duplicate_attributes
            )));
        }

        // Labels must be usable as distinct map keys
        let labels = self.labels();
        let named = labels.named();
        for (i, (name, value)) in named.iter().enumerate() {
            if value.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "tool_list.labels.{name} must not be empty"
                )));
            }
            if let Some((other, _)) = named[..i].iter().find(|(_, v)| v == value) {
                return Err(ConfigError::Validation(format!(
                    "tool_list.labels.{name} must differ from tool_list.labels.{other}, both are {value:?}"
                )));
            }
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }

    /// The reserved key labels for the tool list.
    pub fn labels(&self) -> Labels {
        let l = &self.tool_list.labels;
        Labels {
            generic_tool_list: l.generic_tool_list.clone(),
            attribute_map: l.attribute_map.clone(),
            default_attributes: l.default_attributes.clone(),
            generic: l.generic.clone(),
        }
    }

    /// The duplicate attribute policy. Falls back to [`DuplicatePolicy::Reject`]
    /// for unvalidated configs.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        DuplicatePolicy::from_name(&self.tool_list.duplicate_attributes).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.tool_list.path, "Scarf_ToolList.json");
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Reject);
        assert!(config.output.pretty);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.labels(), Labels::default());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.tool_list.labels.attribute_map, "ScarfAttributes");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [tool_list]
            path = "/opt/swamp/Scarf_ToolList.json"
            duplicate_attributes = "ignore"

            [tool_list.labels]
            generic_tool_list = "generic-tools"
            attribute_map = "attribute-map"

            [output]
            pretty = false

            [logging]
            level = "debug"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.tool_list.path, "/opt/swamp/Scarf_ToolList.json");
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Ignore);
        assert!(!config.output.pretty);
        assert_eq!(config.logging.level, "debug");

        let labels = config.labels();
        assert_eq!(labels.generic_tool_list, "generic-tools");
        assert_eq!(labels.attribute_map, "attribute-map");
        // Unset labels keep their defaults
        assert_eq!(labels.default_attributes, "default");
        assert_eq!(labels.generic, "generic");
    }

    #[test]
    fn test_example_config_parses() {
        let config = AppConfig::parse(include_str!("../../../scarfconv.example.toml")).unwrap();
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Reject);
        let labels = config.labels();
        assert_eq!(labels.attribute_map, "attribute-map");
        assert_eq!(labels.generic_tool_list, "Generic-Toollist");
    }

    #[test]
    fn test_validation_rejects_empty_path() {
        let toml = r#"
            [tool_list]
            path = ""
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_duplicate_policy() {
        let toml = r#"
            [tool_list]
            duplicate_attributes = "overwrite"
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("duplicate_attributes"));
    }

    #[test]
    fn test_validation_rejects_empty_label() {
        let toml = r#"
            [tool_list.labels]
            generic = ""
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("tool_list.labels.generic"));
    }

    #[test]
    fn test_validation_rejects_colliding_labels() {
        let toml = r#"
            [tool_list.labels]
            default_attributes = "generic"
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: tool_list.labels.generic must differ from \
             tool_list.labels.default_attributes, both are \"generic\""
        );
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let toml = r#"
            [logging]
            level = "verbose"
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scarfconv.toml");
        std::fs::write(&path, b"[tool_list]\npath = \"tools.json\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.tool_list.path, "tools.json");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/file.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, b"not valid toml [[[").unwrap();

        let result = AppConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = AppConfig::parse(&text).unwrap();
        assert_eq!(parsed.labels(), config.labels());
        assert_eq!(parsed.tool_list.path, config.tool_list.path);
    }
}
