//! Attribute registry: the universe of known attribute names and their
//! validity for the tool being converted.
//!
//! The registry has two phases, expressed as two types:
//!
//! ```text
//! RegistryBuilder        // discovery order, insert only
//!     → .finalize()      // sort once by name
//!         → AttributeRegistry  // binary search, validity, occurrence counts
//! ```
//!
//! Lookups never happen on an unsorted collection and inserts never happen
//! after the sort, because neither operation exists on the wrong type.

use std::collections::HashSet;

use scarfconv_config::tool_list::DuplicatePolicy;
use tracing::{debug, warn};

/// Errors raised while building the registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate attribute in default list: {0}")]
    Duplicate(String),
}

/// A single known attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEntry {
    name: String,
    valid: bool,
    occurrences: u64,
}

impl AttributeEntry {
    fn new(name: String) -> Self {
        Self {
            name,
            valid: false,
            occurrences: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the attribute is reportable for the resolved tool.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// How many findings carried this attribute.
    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }
}

/// Collects attribute names during the enumeration pass.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<AttributeEntry>,
    seen: HashSet<String>,
    policy: DuplicatePolicy,
}

impl RegistryBuilder {
    /// Create an empty builder with the given duplicate policy.
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            policy,
        }
    }

    /// Append a new entry with `valid = false` and no occurrences.
    ///
    /// Returns `Ok(false)` when the name was already present and the policy
    /// is [`DuplicatePolicy::Ignore`].
    pub fn insert(&mut self, name: &str) -> Result<bool, RegistryError> {
        if self.seen.contains(name) {
            return match self.policy {
                DuplicatePolicy::Reject => Err(RegistryError::Duplicate(name.to_string())),
                DuplicatePolicy::Ignore => {
                    warn!(attribute = %name, "Duplicate attribute ignored");
                    Ok(false)
                }
            };
        }
        self.seen.insert(name.to_string());
        self.entries.push(AttributeEntry::new(name.to_string()));
        Ok(true)
    }

    /// Names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort entries by name and seal the registry for lookups.
    pub fn finalize(self) -> AttributeRegistry {
        let mut entries = self.entries;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = entries.len(), "Attribute registry sealed");
        AttributeRegistry { entries }
    }
}

/// The sealed registry, sorted strictly ascending by name.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    entries: Vec<AttributeEntry>,
}

impl AttributeRegistry {
    /// Binary search for `name`. Matching is exact string equality.
    pub fn find(&self, name: &str) -> Option<&AttributeEntry> {
        self.position(name).map(|i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Mark `name` valid. Unknown names are logged and skipped.
    pub fn mark_valid(&mut self, name: &str) -> bool {
        match self.entry_mut(name) {
            Some(entry) => {
                entry.valid = true;
                true
            }
            None => false,
        }
    }

    /// Validity of `name`; unknown names are logged and treated as invalid.
    pub fn is_valid(&self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => self.entries[i].valid,
            None => {
                warn!(attribute = %name, "Unknown attribute");
                false
            }
        }
    }

    /// Count one more finding carrying `name`. Unknown names are logged and
    /// leave every counter untouched.
    pub fn increment_occurrence(&mut self, name: &str) -> bool {
        match self.entry_mut(name) {
            Some(entry) => {
                entry.occurrences += 1;
                true
            }
            None => false,
        }
    }

    /// All entries in name order.
    pub fn entries(&self) -> std::slice::Iter<'_, AttributeEntry> {
        self.entries.iter()
    }

    /// Entries marked valid, in name order.
    pub fn valid_entries(&self) -> impl Iterator<Item = &AttributeEntry> + '_ {
        self.entries.iter().filter(|e| e.valid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut AttributeEntry> {
        match self.position(name) {
            Some(i) => Some(&mut self.entries[i]),
            None => {
                warn!(attribute = %name, "Unknown attribute");
                None
            }
        }
    }
}

impl<'a> IntoIterator for &'a AttributeRegistry {
    type Item = &'a AttributeEntry;
    type IntoIter = std::slice::Iter<'a, AttributeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}
