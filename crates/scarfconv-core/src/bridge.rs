//! Result-emission bridge: filters findings through the attribute registry.
//!
//! A [`FindingSource`] yields findings one at a time. For each attribute of a
//! finding the bridge asks the registry whether it is valid; valid attributes
//! are kept and counted, the rest are dropped. Filtered findings go to a
//! [`FindingSink`], followed by an [`AttributeSummary`] once the source is
//! exhausted.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::registry::AttributeRegistry;

/// Errors while moving findings from a source to a sink.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to read finding {index}: {error}")]
    Read {
        index: u64,
        #[source]
        error: serde_json::Error,
    },

    #[error("failed to write report: {0}")]
    Write(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One finding: attribute names mapped to opaque values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Finding {
    attributes: Map<String, Value>,
}

impl Finding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<(String, Value)> for Finding {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Finding {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}

/// Supplies findings one at a time.
pub trait FindingSource {
    /// The next finding, or `None` once the source is exhausted.
    fn next_finding(&mut self) -> Result<Option<Finding>, BridgeError>;
}

/// Receives filtered findings and the closing summary.
pub trait FindingSink {
    /// Write one finding containing only reportable attributes. `index` is
    /// zero-based in source order.
    fn write_finding(&mut self, index: u64, finding: &Finding) -> Result<(), BridgeError>;

    fn write_summary(&mut self, summary: &AttributeSummary) -> Result<(), BridgeError>;

    /// Flush and close the output.
    fn finish(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }
}

/// Occurrences of one valid attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCount {
    pub name: String,
    pub occurrences: u64,
}

/// Per valid attribute, how many of the findings carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSummary {
    pub tool: String,
    pub total_findings: u64,
    pub attributes: Vec<AttributeCount>,
}

impl AttributeSummary {
    /// Summarize the valid entries of `registry`, in name order.
    pub fn from_registry(tool: &str, registry: &AttributeRegistry, total_findings: u64) -> Self {
        Self {
            tool: tool.to_string(),
            total_findings,
            attributes: registry
                .valid_entries()
                .map(|e| AttributeCount {
                    name: e.name().to_string(),
                    occurrences: e.occurrences(),
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.attributes
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.occurrences)
    }
}

/// Filters findings against a sealed, resolved registry.
pub struct EmissionBridge<'r> {
    registry: &'r mut AttributeRegistry,
    findings: u64,
}

impl<'r> EmissionBridge<'r> {
    pub fn new(registry: &'r mut AttributeRegistry) -> Self {
        Self {
            registry,
            findings: 0,
        }
    }

    /// Number of findings filtered so far.
    pub fn findings(&self) -> u64 {
        self.findings
    }

    /// Keep only the valid attributes of `finding`, counting each one.
    pub fn filter(&mut self, finding: Finding) -> Finding {
        self.findings += 1;
        let mut kept = Finding::new();
        for (name, value) in finding {
            if self.registry.is_valid(&name) {
                self.registry.increment_occurrence(&name);
                kept.attributes.insert(name, value);
            } else {
                trace!(attribute = %name, "Dropping attribute");
            }
        }
        kept
    }

    pub fn summary(&self, tool: &str) -> AttributeSummary {
        AttributeSummary::from_registry(tool, self.registry, self.findings)
    }

    /// Drain `source` into `sink`, then write and return the summary.
    pub fn run<S, W>(
        mut self,
        tool: &str,
        source: &mut S,
        sink: &mut W,
    ) -> Result<AttributeSummary, BridgeError>
    where
        S: FindingSource + ?Sized,
        W: FindingSink + ?Sized,
    {
        while let Some(finding) = source.next_finding()? {
            let index = self.findings;
            let kept = self.filter(finding);
            sink.write_finding(index, &kept)?;
        }

        let summary = self.summary(tool);
        sink.write_summary(&summary)?;
        sink.finish()?;
        debug!(tool, findings = summary.total_findings, "Finished emitting findings");
        Ok(summary)
    }
}
