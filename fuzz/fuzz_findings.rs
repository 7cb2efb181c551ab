//! Fuzz target for the JSON Lines reader and report writer.
//!
//! Run with: cargo +nightly fuzz run fuzz_findings
//!
//! Arbitrary findings input must never panic, and whatever report comes out
//! must be well-formed JSON.

#![no_main]

use libfuzzer_sys::fuzz_target;
use scarfconv_core::{
    AttributeLoader, EmissionBridge, JsonLinesSource, JsonReportWriter, MemorySource,
};

const TOOL_LIST: &str = r#"{
    "default": ["BugCode", "BugMessage", "Location"],
    "ScarfAttributes": {"generic": ["BugMessage", "Location"]}
}"#;

fuzz_target!(|data: &[u8]| {
    let Ok(mut loaded) = AttributeLoader::default().load(&MemorySource::new(TOOL_LIST), "lint")
    else {
        return;
    };

    let mut source = JsonLinesSource::new(data);
    let mut writer = JsonReportWriter::new(Vec::new()).pretty(data.len() % 2 == 0);
    let ok = EmissionBridge::new(&mut loaded.registry)
        .run("lint", &mut source, &mut writer)
        .is_ok();

    if ok {
        let report = writer.into_inner();
        assert!(serde_json::from_slice::<serde_json::Value>(&report).is_ok());
    }
});
