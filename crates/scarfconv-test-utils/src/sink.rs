//! In-memory [`FindingSink`] for bridge tests.

use scarfconv_core::bridge::{AttributeSummary, BridgeError, Finding, FindingSink};

/// Keeps everything written to it.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub findings: Vec<Finding>,
    pub summary: Option<AttributeSummary>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute names of each written finding, in order.
    pub fn names(&self) -> Vec<Vec<String>> {
        self.findings
            .iter()
            .map(|f| f.names().map(str::to_string).collect())
            .collect()
    }
}

impl FindingSink for MemorySink {
    fn write_finding(&mut self, _index: u64, finding: &Finding) -> Result<(), BridgeError> {
        self.findings.push(finding.clone());
        Ok(())
    }

    fn write_summary(&mut self, summary: &AttributeSummary) -> Result<(), BridgeError> {
        self.summary = Some(summary.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), BridgeError> {
        self.finished = true;
        Ok(())
    }
}
