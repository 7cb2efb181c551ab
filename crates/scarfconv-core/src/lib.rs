#![deny(unsafe_code)]

//! scarfconv core: attribute registry and tool list passes.
//!
//! A tool list is a JSON document naming every attribute a finding may carry,
//! which attributes each tool reports, and which tools fall back to the
//! generic set. Loading it takes two streaming passes over the document:
//!
//! 1. **Enumeration** collects the universe of attribute names into a
//!    [`RegistryBuilder`], which is then sealed into an [`AttributeRegistry`].
//! 2. **Resolution** works out which of those attributes are valid for the
//!    tool being converted and marks them.
//!
//! The [`EmissionBridge`] then filters findings against the registry, keeping
//! valid attributes and counting how often each one appears.

/// Result-emission bridge and the source/sink traits it connects.
pub mod bridge;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Streaming structural events over a JSON document.
pub mod events;
/// Two-pass tool list loading from files or memory.
pub mod loader;
/// Enumeration and resolution passes.
pub mod passes;
/// Attribute registry: builder and sealed, sorted lookup table.
pub mod registry;
/// JSON Lines finding source and JSON report writer.
pub mod report;
/// Document context tracker.
pub mod tracker;

pub use bridge::{AttributeSummary, BridgeError, EmissionBridge, Finding, FindingSink, FindingSource};
pub use loader::{AttributeLoader, ConfigSource, FileSource, LoadError, LoadedAttributes, MemorySource};
pub use passes::{ToolClass, ToolResolution};
pub use registry::{AttributeRegistry, RegistryBuilder, RegistryError};
pub use report::{JsonLinesSource, JsonReportWriter, VecSource};
