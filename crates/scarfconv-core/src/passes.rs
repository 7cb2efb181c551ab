//! The two readings of the tool list.
//!
//! [`EnumerationPass`] collects every name under the default label into a
//! [`RegistryBuilder`]. [`ResolutionPass`] gathers everything needed to
//! classify one tool into a [`ToolResolution`]. Classification is decided
//! only once the whole document has been read, so the relative order of the
//! generic tool list, the `generic` section and the tool's own section does
//! not matter.

use std::fmt;

use scarfconv_config::tool_list::Labels;
use tracing::{debug, info, warn};

use crate::events::{Event, EventHandler};
use crate::registry::{AttributeRegistry, RegistryBuilder, RegistryError};
use crate::tracker::{ContextTracker, List, Section, Signal, TrackerError};

/// Errors that abort a pass.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Pass 1: enumerate the attribute universe.
pub struct EnumerationPass<'r> {
    tracker: ContextTracker,
    registry: &'r mut RegistryBuilder,
    inserted: usize,
}

impl<'r> EnumerationPass<'r> {
    pub fn new(labels: Labels, registry: &'r mut RegistryBuilder) -> Self {
        Self {
            tracker: ContextTracker::new(labels),
            registry,
            inserted: 0,
        }
    }

    /// Entries added by this pass (duplicates skipped under the ignore
    /// policy are not counted).
    pub fn inserted(&self) -> usize {
        self.inserted
    }
}

impl EventHandler for EnumerationPass<'_> {
    type Error = PassError;

    fn handle(&mut self, event: Event<'_>) -> Result<(), PassError> {
        if let Some(Signal::Member {
            list: List::Default,
            value,
        }) = self.tracker.advance(event)?
        {
            if self.registry.insert(value)? {
                self.inserted += 1;
            }
        }
        Ok(())
    }
}

/// How a tool obtained its attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolClass {
    /// The attribute map has a section named after the tool.
    Specific,
    /// The tool uses the `generic` section.
    Generic(GenericReason),
    /// Neither a section of its own nor a `generic` section to fall back on.
    Unclassified,
}

/// Why a tool is treated as generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericReason {
    /// Named in the generic tool list.
    Listed,
    /// Not named anywhere, but a `generic` section exists.
    Fallback,
}

impl ToolClass {
    pub fn is_generic(&self) -> bool {
        matches!(self, ToolClass::Generic(_))
    }
}

impl fmt::Display for ToolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolClass::Specific => f.write_str("tool-specific"),
            ToolClass::Generic(GenericReason::Listed) => f.write_str("generic (listed)"),
            ToolClass::Generic(GenericReason::Fallback) => f.write_str("generic (fallback)"),
            ToolClass::Unclassified => f.write_str("unclassified"),
        }
    }
}

/// Everything the resolution pass learned about one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResolution {
    tool: String,
    listed_generic: bool,
    has_generic_section: bool,
    generic: Vec<String>,
    specific: Option<Vec<String>>,
}

impl ToolResolution {
    fn new(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            listed_generic: false,
            has_generic_section: false,
            generic: Vec::new(),
            specific: None,
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Whether the tool appears in the generic tool list.
    pub fn is_listed_generic(&self) -> bool {
        self.listed_generic
    }

    /// Whether the attribute map has a section named after the tool.
    pub fn has_own_section(&self) -> bool {
        self.specific.is_some()
    }

    /// Classify the tool. A generic tool list entry beats a section of the
    /// tool's own, which beats the fallback to the `generic` section.
    pub fn class(&self) -> ToolClass {
        if self.listed_generic {
            ToolClass::Generic(GenericReason::Listed)
        } else if self.specific.is_some() {
            ToolClass::Specific
        } else if self.has_generic_section {
            ToolClass::Generic(GenericReason::Fallback)
        } else {
            ToolClass::Unclassified
        }
    }

    /// Attribute names that should be valid for this tool, in document order.
    pub fn valid_attributes(&self) -> &[String] {
        match (self.class(), &self.specific) {
            (ToolClass::Specific, Some(names)) => names.as_slice(),
            (ToolClass::Generic(_), _) => self.generic.as_slice(),
            _ => &[],
        }
    }

    /// Mark this tool's attributes valid. Returns how many names were found
    /// in the registry; unknown names are logged by the registry.
    pub fn apply(&self, registry: &mut AttributeRegistry) -> usize {
        let class = self.class();
        if class == ToolClass::Unclassified {
            warn!(tool = %self.tool, "Tool has no attribute section and no generic fallback");
        }
        if self.listed_generic && self.specific.is_some() {
            info!(
                tool = %self.tool,
                "Tool has its own section but is in the generic tool list; using generic attributes"
            );
        }

        let marked = self
            .valid_attributes()
            .iter()
            .filter(|name| registry.mark_valid(name))
            .count();
        debug!(tool = %self.tool, %class, marked, "Applied tool resolution");
        marked
    }
}

/// Pass 2: gather the classification state for one tool.
pub struct ResolutionPass {
    tracker: ContextTracker,
    resolution: ToolResolution,
}

impl ResolutionPass {
    pub fn new(labels: Labels, tool: &str) -> Self {
        Self {
            tracker: ContextTracker::new(labels),
            resolution: ToolResolution::new(tool),
        }
    }

    /// Finish the pass. Only meaningful once the whole document was streamed.
    pub fn finish(self) -> ToolResolution {
        self.resolution
    }
}

impl EventHandler for ResolutionPass {
    type Error = PassError;

    fn handle(&mut self, event: Event<'_>) -> Result<(), PassError> {
        let state = &mut self.resolution;
        match self.tracker.advance(event)? {
            Some(Signal::SectionOpened(Section::Generic)) => {
                state.has_generic_section = true;
            }
            Some(Signal::SectionOpened(Section::Tool(name))) if *name == state.tool => {
                debug!(tool = %state.tool, "Found tool-specific attribute section");
                state.specific.get_or_insert_with(Vec::new);
            }
            Some(Signal::Member {
                list: List::GenericTools,
                value,
            }) if value == state.tool => {
                debug!(tool = %state.tool, "Found tool in the generic tool list");
                state.listed_generic = true;
            }
            Some(Signal::Member {
                list: List::Section(Section::Generic),
                value,
            }) => state.generic.push(value.to_string()),
            Some(Signal::Member {
                list: List::Section(Section::Tool(name)),
                value,
            }) if *name == state.tool => {
                state
                    .specific
                    .get_or_insert_with(Vec::new)
                    .push(value.to_string());
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::stream;
    use pretty_assertions::assert_eq;
    use scarfconv_config::tool_list::DuplicatePolicy;

    fn labels() -> Labels {
        Labels::default().with_attribute_map("attribute-map")
    }

    fn resolve(json: &str, tool: &str) -> ToolResolution {
        let mut pass = ResolutionPass::new(labels(), tool);
        stream(json.as_bytes(), &mut pass).unwrap();
        pass.finish()
    }

    const SCENARIO: &str = r#"{
        "default": ["sev", "loc"],
        "Generic-Toollist": ["ToolA"],
        "attribute-map": {"generic": ["sev"], "ToolB": ["loc"]}
    }"#;

    #[test]
    fn test_enumeration_collects_default_list() {
        let mut builder = RegistryBuilder::new(DuplicatePolicy::Reject);
        let mut pass = EnumerationPass::new(labels(), &mut builder);
        stream(SCENARIO.as_bytes(), &mut pass).unwrap();
        assert_eq!(pass.inserted(), 2);
        assert_eq!(builder.names().collect::<Vec<_>>(), vec!["sev", "loc"]);
    }

    #[test]
    fn test_enumeration_ignores_other_lists() {
        let json = r#"{"Generic-Toollist": ["ToolA"], "attribute-map": {"generic": ["sev"]}}"#;
        let mut builder = RegistryBuilder::default();
        stream(json.as_bytes(), &mut EnumerationPass::new(labels(), &mut builder)).unwrap();
        assert!(builder.is_empty());
    }

    #[test]
    fn test_enumeration_duplicate_aborts() {
        let json = r#"{"default": ["sev", "loc", "sev"]}"#;
        let mut builder = RegistryBuilder::new(DuplicatePolicy::Reject);
        let result = stream(json.as_bytes(), &mut EnumerationPass::new(labels(), &mut builder));
        assert!(matches!(
            result,
            Err(crate::events::StreamError::Handler(PassError::Registry(
                RegistryError::Duplicate(ref name)
            ))) if name == "sev"
        ));
    }

    #[test]
    fn test_listed_tool_is_generic() {
        let resolution = resolve(SCENARIO, "ToolA");
        assert_eq!(resolution.class(), ToolClass::Generic(GenericReason::Listed));
        assert!(resolution.is_listed_generic());
        assert_eq!(resolution.valid_attributes(), ["sev"]);
    }

    #[test]
    fn test_keyed_tool_is_specific() {
        let resolution = resolve(SCENARIO, "ToolB");
        assert_eq!(resolution.class(), ToolClass::Specific);
        assert!(resolution.has_own_section());
        assert_eq!(resolution.valid_attributes(), ["loc"]);
    }

    #[test]
    fn test_unknown_tool_falls_back_to_generic() {
        let resolution = resolve(SCENARIO, "ToolC");
        assert_eq!(resolution.class(), ToolClass::Generic(GenericReason::Fallback));
        assert_eq!(resolution.valid_attributes(), ["sev"]);
    }

    #[test]
    fn test_tool_section_before_generic_section() {
        let json = r#"{"attribute-map": {"ToolB": ["loc"], "generic": ["sev"]}}"#;
        let resolution = resolve(json, "ToolB");
        assert_eq!(resolution.class(), ToolClass::Specific);
        assert_eq!(resolution.valid_attributes(), ["loc"]);
    }

    #[test]
    fn test_generic_tool_list_after_attribute_map() {
        let json = r#"{
            "attribute-map": {"generic": ["sev"], "ToolB": ["loc"]},
            "Generic-Toollist": ["ToolA"]
        }"#;
        assert_eq!(
            resolve(json, "ToolA").class(),
            ToolClass::Generic(GenericReason::Listed)
        );
        assert_eq!(resolve(json, "ToolB").class(), ToolClass::Specific);
    }

    #[test]
    fn test_generic_listing_beats_own_section() {
        let json = r#"{
            "Generic-Toollist": ["ToolB"],
            "attribute-map": {"generic": ["sev"], "ToolB": ["loc"]}
        }"#;
        let resolution = resolve(json, "ToolB");
        assert!(resolution.is_listed_generic());
        assert!(resolution.has_own_section());
        assert_eq!(resolution.class(), ToolClass::Generic(GenericReason::Listed));
        assert_eq!(resolution.valid_attributes(), ["sev"]);
    }

    #[test]
    fn test_generic_listing_wins_regardless_of_order() {
        let json = r#"{
            "attribute-map": {"ToolB": ["loc"], "generic": ["sev"]},
            "Generic-Toollist": ["ToolB"]
        }"#;
        let resolution = resolve(json, "ToolB");
        assert_eq!(resolution.class(), ToolClass::Generic(GenericReason::Listed));
        assert_eq!(resolution.valid_attributes(), ["sev"]);
    }

    #[test]
    fn test_empty_own_section_is_still_specific() {
        let json = r#"{"attribute-map": {"generic": ["sev"], "ToolB": []}}"#;
        let resolution = resolve(json, "ToolB");
        assert_eq!(resolution.class(), ToolClass::Specific);
        assert!(resolution.valid_attributes().is_empty());
    }

    #[test]
    fn test_no_generic_section_leaves_tool_unclassified() {
        let json = r#"{"attribute-map": {"ToolB": ["loc"]}}"#;
        let resolution = resolve(json, "ToolC");
        assert_eq!(resolution.class(), ToolClass::Unclassified);
        assert!(resolution.valid_attributes().is_empty());
    }

    #[test]
    fn test_tool_name_match_is_exact() {
        let resolution = resolve(SCENARIO, "toolb");
        assert_eq!(resolution.class(), ToolClass::Generic(GenericReason::Fallback));
    }

    #[test]
    fn test_repeated_sections_accumulate() {
        let json = r#"{"attribute-map": {"generic": ["a"], "generic": ["b"]}}"#;
        assert_eq!(resolve(json, "ToolC").valid_attributes(), ["a", "b"]);
    }

    #[test]
    fn test_apply_marks_registry() {
        let mut builder = RegistryBuilder::default();
        for name in ["sev", "loc"] {
            builder.insert(name).unwrap();
        }
        let mut registry = builder.finalize();

        let marked = resolve(SCENARIO, "ToolB").apply(&mut registry);
        assert_eq!(marked, 1);
        assert!(registry.is_valid("loc"));
        assert!(!registry.is_valid("sev"));
    }

    #[test]
    fn test_apply_skips_unknown_names() {
        let json = r#"{"attribute-map": {"generic": ["sev", "ghost"]}}"#;
        let mut builder = RegistryBuilder::default();
        builder.insert("sev").unwrap();
        let mut registry = builder.finalize();

        assert_eq!(resolve(json, "ToolC").apply(&mut registry), 1);
        assert!(registry.is_valid("sev"));
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn test_class_display() {
        assert_eq!(ToolClass::Specific.to_string(), "tool-specific");
        assert_eq!(
            ToolClass::Generic(GenericReason::Fallback).to_string(),
            "generic (fallback)"
        );
        assert!(ToolClass::Generic(GenericReason::Listed).is_generic());
    }
}
