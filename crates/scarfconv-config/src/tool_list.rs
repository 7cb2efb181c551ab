//! Typed settings for reading the tool list document.
//!
//! The TOML layer in [`crate::ToolListConfig`] keeps plain strings; these are
//! the values the parsing passes in `scarfconv-core` actually consume.

use std::fmt;

/// Reserved key labels that mark the significant regions of a tool list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Key of the array listing tools that use the generic attribute set.
    pub generic_tool_list: String,
    /// Key of the object mapping `generic` / tool names to attribute arrays.
    pub attribute_map: String,
    /// Key of the array enumerating every known attribute.
    pub default_attributes: String,
    /// Key inside the attribute map holding the generic attribute set.
    pub generic: String,
}

impl Labels {
    /// Replace the attribute map label.
    pub fn with_attribute_map(mut self, label: impl Into<String>) -> Self {
        self.attribute_map = label.into();
        self
    }

    /// Replace the generic tool list label.
    pub fn with_generic_tool_list(mut self, label: impl Into<String>) -> Self {
        self.generic_tool_list = label.into();
        self
    }

    /// All four labels, in declaration order, paired with their config names.
    pub fn named(&self) -> [(&'static str, &str); 4] {
        [
            ("generic_tool_list", &self.generic_tool_list),
            ("attribute_map", &self.attribute_map),
            ("default_attributes", &self.default_attributes),
            ("generic", &self.generic),
        ]
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            generic_tool_list: "Generic-Toollist".to_string(),
            attribute_map: "ScarfAttributes".to_string(),
            default_attributes: "default".to_string(),
            generic: "generic".to_string(),
        }
    }
}

/// What to do when the default attribute array names the same attribute twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail the enumeration pass.
    #[default]
    Reject,
    /// Keep the first entry and log a warning.
    Ignore,
}

impl DuplicatePolicy {
    /// Parse the TOML spelling (`"reject"` or `"ignore"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reject" => Some(Self::Reject),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
