//! Tool list fixtures.
//!
//! [`SCENARIO`] is the small document most tests share: `ToolA` is listed as
//! generic, `ToolB` has its own section. It uses `"attribute-map"` as the
//! attribute map label, so pair it with [`scenario_labels`].

use std::path::{Path, PathBuf};

use scarfconv_config::tool_list::Labels;
use tempfile::TempDir;

pub const SCENARIO: &str = r#"{
    "default": ["sev", "loc"],
    "Generic-Toollist": ["ToolA"],
    "attribute-map": {
        "generic": ["sev"],
        "ToolB": ["loc"]
    }
}"#;

/// A FindBugs-flavoured document using the default labels.
pub const FINDBUGS: &str = r#"{
    "default": ["BugCode", "BugMessage", "BugRank", "BugSeverity", "Location"],
    "ScarfAttributes": {
        "generic": ["BugMessage", "Location"],
        "findbugs": ["BugCode", "BugMessage", "BugRank", "Location"],
        "cppcheck": ["BugCode", "BugSeverity", "Location"]
    },
    "Generic-Toollist": ["pylint", "flake8"]
}"#;

/// Labels matching [`SCENARIO`].
pub fn scenario_labels() -> Labels {
    Labels::default().with_attribute_map("attribute-map")
}

/// A tool list written to a temp directory that lives as long as this value.
pub struct ToolListFile {
    path: PathBuf,
    temp_dir: TempDir,
}

impl ToolListFile {
    pub fn with_json(json: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("Scarf_ToolList.json");
        std::fs::write(&path, json).expect("failed to write tool list");
        Self {
            path,
            temp_dir,
        }
    }

    pub fn scenario() -> Self {
        Self::with_json(SCENARIO)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the tool list, for placing sibling files.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }
}
