//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use std::path::Path;

use scarfconv_config::AppConfig;
use scarfconv_config::tool_list::DuplicatePolicy;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .tool_list_path(fixture.path())
///     .attribute_map_label("attribute-map")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn tool_list_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.tool_list.path = path.as_ref().display().to_string();
        self
    }

    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.config.tool_list.duplicate_attributes = policy.as_str().to_string();
        self
    }

    pub fn attribute_map_label(mut self, label: &str) -> Self {
        self.config.tool_list.labels.attribute_map = label.to_string();
        self
    }

    pub fn generic_tool_list_label(mut self, label: &str) -> Self {
        self.config.tool_list.labels.generic_tool_list = label.to_string();
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.output.pretty = pretty;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
